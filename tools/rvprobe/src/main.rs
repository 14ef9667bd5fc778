//! rvprobe: detect the host's vector unit and show what the encoder
//! emits with the resulting capability flags.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use rvjit_backend::riscv::probe::{detect_vector_support, ProbeStub};
use rvjit_backend::riscv::regs::{A0, A1, RA, SP};
use rvjit_backend::{Assembler, CodeBuffer};
use rvjit_core::features::ENV_MAX_VECTOR_SIZE;
use rvjit_core::{Features, Label};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Never emit compressed instructions.
    #[clap(long)]
    no_rvc: bool,

    /// Skip the vector probe and disable vector instructions.
    #[clap(long)]
    no_rvv: bool,

    /// Requested maximum vector size in bytes.
    #[clap(long, value_name = "BYTES", env = ENV_MAX_VECTOR_SIZE)]
    max_vector_size: Option<usize>,

    /// Hex-dump the probe stub and its fault points.
    #[clap(long)]
    dump: bool,

    /// Assemble a small function with and without compression.
    #[clap(long)]
    demo: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut features = Features::from_env().context("reading RVJIT_* environment")?;
    if args.no_rvc {
        features.use_rvc = false;
    }
    if args.no_rvv {
        features.use_rvv = false;
    }
    if let Some(size) = args.max_vector_size {
        features.max_vector_size = Some(size);
    }
    debug!(?features, "capability flags before probing");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.dump {
        dump_stub(&mut out)?;
    }

    let result = detect_vector_support(&mut features).context("vector probe failed")?;
    writeln!(out, "vector unit:     {}", if result.supported() { "present" } else { "absent" })?;
    writeln!(out, "vlenb:           {}", result.vlenb)?;
    writeln!(out, "use_rvc:         {}", features.use_rvc)?;
    writeln!(out, "use_rvv:         {}", features.use_rvv)?;
    match features.max_vector_size {
        Some(size) => writeln!(out, "max_vector_size: {size}")?,
        None => writeln!(out, "max_vector_size: default")?,
    }

    if args.demo {
        demo(&features, &mut out)?;
    }
    Ok(())
}

fn dump_stub(w: &mut impl Write) -> Result<()> {
    let stub = ProbeStub::generate().context("allocating probe stub")?;
    let entry = stub.entry();
    let points = stub.points();
    writeln!(w, "probe stub at {entry:#x}:")?;
    hex_dump(stub.code(), w)?;
    writeln!(w, "fault_pc        +{:#x}", points.fault_pc - entry)?;
    writeln!(w, "fault_pc2       +{:#x}", points.fault_pc2 - entry)?;
    writeln!(w, "continuation_pc +{:#x}", points.continuation_pc - entry)?;
    writeln!(w)?;
    Ok(())
}

/// Function prologue, a forward branch and an epilogue.
fn demo_body(asm: &mut Assembler<'_>) {
    let mut done = Label::new(0);
    asm.addi(SP, SP, -16);
    asm.sd(RA, SP, 8);
    asm.li(A0, 0);
    asm.beqz(A1, &mut done);
    asm.add(A0, A0, A1);
    asm.bind(&mut done);
    asm.ld(RA, SP, 8);
    asm.addi(SP, SP, 16);
    asm.ret();
}

fn demo(features: &Features, w: &mut impl Write) -> Result<()> {
    let mut canonical = CodeBuffer::with_default_size().context("allocating code buffer")?;
    demo_body(&mut Assembler::with_features(&mut canonical, features));

    let mut compact = CodeBuffer::with_default_size().context("allocating code buffer")?;
    Assembler::with_features(&mut compact, features).with_compressible(demo_body);

    writeln!(w)?;
    writeln!(w, "canonical ({} bytes):", canonical.offset())?;
    hex_dump(canonical.as_slice(), w)?;
    writeln!(w, "compressible region ({} bytes):", compact.offset())?;
    hex_dump(compact.as_slice(), w)?;
    Ok(())
}

fn hex_dump(data: &[u8], w: &mut impl Write) -> io::Result<()> {
    for (i, chunk) in data.chunks(16).enumerate() {
        write!(w, "{:04x}: ", i * 16)?;
        for (j, pair) in chunk.chunks(2).enumerate() {
            if j > 0 && j % 2 == 0 {
                write!(w, " ")?;
            }
            if let [lo, hi] = pair {
                write!(w, " {:04x}", u16::from_le_bytes([*lo, *hi]))?;
            } else {
                write!(w, " {:02x}", pair[0])?;
            }
        }
        writeln!(w)?;
    }
    Ok(())
}
