//! `SIGILL` handling for the vector probe on RISC-V Linux.

use std::io;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::probe::FaultPoints;

const REG_PC: usize = 0;
const REG_A0: usize = 10;
const SYS_RISCV_FLUSH_ICACHE: libc::c_long = 259;

static FAULT_PC: AtomicUsize = AtomicUsize::new(0);
static FAULT_PC2: AtomicUsize = AtomicUsize::new(0);
static CONTINUATION_PC: AtomicUsize = AtomicUsize::new(0);
static HANDLER_LOCK: Mutex<()> = Mutex::new(());

extern "C" fn on_sigill(_sig: libc::c_int, _info: *mut libc::siginfo_t, ctx: *mut libc::c_void) {
    // SAFETY: an SA_SIGINFO handler receives the interrupted ucontext.
    let uc = unsafe { &mut *(ctx as *mut libc::ucontext_t) };
    let gregs = &mut uc.uc_mcontext.__gregs;
    let points = FaultPoints {
        fault_pc: FAULT_PC.load(Ordering::Acquire),
        fault_pc2: FAULT_PC2.load(Ordering::Acquire),
        continuation_pc: CONTINUATION_PC.load(Ordering::Acquire),
    };
    match points.resume_pc(gregs[REG_PC] as usize) {
        Some(resume) => {
            gregs[REG_PC] = resume as libc::c_ulong;
            gregs[REG_A0] = 0;
        }
        None => {
            // Not ours: re-execute the instruction with the default action.
            // SAFETY: signal() is async-signal-safe.
            unsafe { libc::signal(libc::SIGILL, libc::SIG_DFL) };
        }
    }
}

/// Run `f` with a `SIGILL` handler that redirects traps at the fault
/// points to the continuation point with `a0 = 0`.
pub(super) fn with_fault_handler<R>(points: FaultPoints, f: impl FnOnce() -> R) -> io::Result<R> {
    let _guard = HANDLER_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    FAULT_PC.store(points.fault_pc, Ordering::Release);
    FAULT_PC2.store(points.fault_pc2, Ordering::Release);
    CONTINUATION_PC.store(points.continuation_pc, Ordering::Release);

    // SAFETY: sigaction structs are plain data; zero is a valid start.
    let mut action: libc::sigaction = unsafe { mem::zeroed() };
    let mut previous: libc::sigaction = unsafe { mem::zeroed() };
    action.sa_sigaction = on_sigill as usize;
    action.sa_flags = libc::SA_SIGINFO;
    unsafe {
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(libc::SIGILL, &action, &mut previous) != 0 {
            return Err(io::Error::last_os_error());
        }
    }

    let out = f();

    // SAFETY: restores the disposition saved above.
    unsafe { libc::sigaction(libc::SIGILL, &previous, ptr::null_mut()) };
    Ok(out)
}

/// Make freshly written code visible to instruction fetch.
pub(super) fn flush_icache(start: usize, len: usize) {
    // SAFETY: riscv_flush_icache only takes an address range and flags.
    unsafe { libc::syscall(SYS_RISCV_FLUSH_ICACHE, start, start + len, 0usize) };
}
