use rvjit_backend::riscv::opcodes::{CSR_VCSR, CSR_VLENB};
use rvjit_backend::riscv::probe::probe_vector_support;
use rvjit_backend::riscv::{FaultPoints, ProbeError, ProbeStub, StubExecutor};
use rvjit_core::bits::extract;
use rvjit_core::Features;

/// What the simulated CPU does with the vector CSRs.
#[derive(Clone, Copy)]
enum VectorUnit {
    /// Every vector CSR read traps.
    Absent,
    /// `vcsr` reads as zero but `vlenb` traps.
    NoVlenb,
    /// Both CSRs are readable.
    Present(u32),
}

/// Interprets the probe stub instead of running it. A trapping CSR read
/// is resolved through `FaultPoints::resume_pc`, the way the native
/// signal handler does it.
struct SimulatedCpu {
    unit: VectorUnit,
    /// Stub offsets of the instructions that trapped.
    traps: Vec<usize>,
}

impl SimulatedCpu {
    fn new(unit: VectorUnit) -> Self {
        Self { unit, traps: Vec::new() }
    }

    fn traps_on(&self, csr: u32) -> bool {
        match self.unit {
            VectorUnit::Absent => true,
            VectorUnit::NoVlenb => csr == CSR_VLENB,
            VectorUnit::Present(_) => false,
        }
    }
}

impl StubExecutor for SimulatedCpu {
    fn execute(&mut self, stub: &ProbeStub) -> Result<u32, ProbeError> {
        let code = stub.code();
        let entry = stub.entry();
        let points = stub.points();
        let mut pc = entry;
        let mut a0: u64 = 0xdead_beef;
        loop {
            let off = pc - entry;
            let insn = u32::from_le_bytes(code[off..off + 4].try_into().unwrap());
            match extract(insn, 6, 0) {
                // addi a0, zero, 0
                0x13 => {
                    assert_eq!(insn, 0x0000_0513);
                    a0 = 0;
                    pc += 4;
                }
                // csrrs a0, csr, zero
                0x73 => {
                    assert_eq!(extract(insn, 11, 7), 10);
                    let csr = extract(insn, 31, 20);
                    if self.traps_on(csr) {
                        self.traps.push(off);
                        pc = points.resume_pc(pc).expect("trap outside the fault points");
                        a0 = 0;
                    } else {
                        a0 = match self.unit {
                            VectorUnit::Present(vlenb) if csr == CSR_VLENB => vlenb as u64,
                            _ => 0,
                        };
                        pc += 4;
                    }
                }
                // jalr zero, 0(ra)
                0x67 => return Ok(a0 as u32),
                _ => panic!("unexpected instruction {insn:#010x} at {off:#x}"),
            }
        }
    }
}

#[test]
fn test_stub_layout() {
    let stub = ProbeStub::generate().unwrap();
    let entry = stub.entry();
    assert_eq!(
        stub.points(),
        FaultPoints {
            fault_pc: entry + 4,
            fault_pc2: entry + 12,
            continuation_pc: entry + 16,
        }
    );
    let words: Vec<u32> = stub
        .code()
        .chunks(4)
        .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
        .collect();
    assert_eq!(
        words,
        vec![0x0000_0513, 0x00f0_2573, 0x0000_0513, 0xc220_2573, 0x0000_8067]
    );
    assert_eq!(extract(words[1], 31, 20), CSR_VCSR);
    assert_eq!(extract(words[3], 31, 20), CSR_VLENB);
}

#[test]
fn test_resume_pc() {
    let points = FaultPoints {
        fault_pc: 0x1004,
        fault_pc2: 0x100c,
        continuation_pc: 0x1010,
    };
    assert_eq!(points.resume_pc(0x1004), Some(0x1010));
    assert_eq!(points.resume_pc(0x100c), Some(0x1010));
    assert_eq!(points.resume_pc(0x1008), None);
    assert_eq!(points.resume_pc(0x1010), None);
}

#[test]
fn test_probe_without_vector_unit() {
    let mut features = Features::default();
    let mut cpu = SimulatedCpu::new(VectorUnit::Absent);
    let result = probe_vector_support(&mut features, &mut cpu).unwrap();
    assert_eq!(result.vlenb, 0);
    assert!(!result.supported());
    assert!(result.points.is_some());
    assert_eq!(cpu.traps, vec![4]);
    assert!(!features.use_rvv);
    assert_eq!(features.max_vector_size, Some(0));
}

#[test]
fn test_probe_with_vlenb_trap() {
    let mut features = Features::default();
    let mut cpu = SimulatedCpu::new(VectorUnit::NoVlenb);
    let result = probe_vector_support(&mut features, &mut cpu).unwrap();
    // Only the `vlenb` read at fault_pc2 trapped.
    assert_eq!(cpu.traps, vec![12]);
    assert!(result.points.is_some());
    assert_eq!(result.vlenb, 0);
    assert!(!result.supported());
    assert!(!features.use_rvv);
    assert_eq!(features.max_vector_size, Some(0));
}

#[test]
fn test_probe_with_vector_unit() {
    let mut features = Features::default();
    let mut cpu = SimulatedCpu::new(VectorUnit::Present(16));
    let result = probe_vector_support(&mut features, &mut cpu).unwrap();
    assert_eq!(result.vlenb, 16);
    assert!(result.supported());
    assert!(cpu.traps.is_empty());
    assert!(features.use_rvv);
    assert_eq!(features.max_vector_size, Some(16));
}

#[test]
fn test_probe_clamps_requested_size() {
    let mut features = Features::default().with_max_vector_size(64);
    let result = probe_vector_support(&mut features, &mut SimulatedCpu::new(VectorUnit::Present(32))).unwrap();
    assert_eq!(result.vlenb, 32);
    assert_eq!(features.max_vector_size, Some(32));
}

#[test]
fn test_probe_reports_bad_size() {
    let mut features = Features::default().with_max_vector_size(48);
    let err = probe_vector_support(&mut features, &mut SimulatedCpu::new(VectorUnit::Present(32))).unwrap_err();
    assert!(matches!(err, ProbeError::Feature(_)));
}

#[test]
fn test_probe_skipped_when_rvv_off() {
    struct Unreachable;
    impl StubExecutor for Unreachable {
        fn execute(&mut self, _stub: &ProbeStub) -> Result<u32, ProbeError> {
            panic!("the stub must not run when RVV is off");
        }
    }

    let mut features = Features::default().with_rvv(false);
    let result = probe_vector_support(&mut features, &mut Unreachable).unwrap();
    assert_eq!(result.vlenb, 0);
    assert_eq!(result.points, None);
    assert_eq!(features.max_vector_size, Some(0));
}

#[cfg(not(all(target_arch = "riscv64", target_os = "linux")))]
#[test]
fn test_native_probe_on_foreign_host() {
    use rvjit_backend::riscv::probe::{detect_vector_support, hwcap_has_vector};

    assert!(!hwcap_has_vector());
    let mut features = Features::default();
    let result = detect_vector_support(&mut features).unwrap();
    assert_eq!(result.vlenb, 0);
    assert!(!features.use_rvv);
    assert_eq!(features.max_vector_size, Some(0));
}
