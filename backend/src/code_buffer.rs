use std::io;
use std::ptr;

/// Default code buffer size: 1 MiB.
const DEFAULT_CODE_BUF_SIZE: usize = 1024 * 1024;

/// JIT code buffer backed by mmap'd memory.
///
/// Holds a little-endian stream of 16-bit and 32-bit RISC-V instruction
/// words. Follows W^X discipline: the buffer is either writable or
/// executable, never both. One buffer has exactly one writer.
pub struct CodeBuffer {
    ptr: *mut u8,
    size: usize,
    offset: usize,
}

// SAFETY: CodeBuffer owns its mmap'd memory exclusively.
unsafe impl Send for CodeBuffer {}

impl CodeBuffer {
    /// Allocate a new code buffer of the given size (rounded up to page size).
    pub fn new(size: usize) -> io::Result<Self> {
        let page_size = page_size();
        let size = (size.max(1) + page_size - 1) & !(page_size - 1);

        // SAFETY: mmap with MAP_ANONYMOUS | MAP_PRIVATE, no file backing.
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            ptr: ptr as *mut u8,
            size,
            offset: 0,
        })
    }

    /// Allocate with the default size (1 MiB).
    pub fn with_default_size() -> io::Result<Self> {
        Self::new(DEFAULT_CODE_BUF_SIZE)
    }

    /// Current write offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Remaining writable bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.size - self.offset
    }

    /// Raw pointer to the start of the buffer.
    #[inline]
    pub fn base_ptr(&self) -> *const u8 {
        self.ptr as *const u8
    }

    /// Absolute address of a buffer offset.
    #[inline]
    pub fn addr_of(&self, offset: usize) -> usize {
        assert!(offset <= self.size);
        self.ptr as usize + offset
    }

    // -- Emit methods --

    #[inline]
    pub fn emit_u16(&mut self, val: u16) {
        assert!(self.remaining() >= 2, "code buffer overflow");
        // SAFETY: bounds checked above; the mapping is writable while emitting.
        unsafe { (self.ptr.add(self.offset) as *mut u16).write_unaligned(val.to_le()) };
        self.offset += 2;
    }

    #[inline]
    pub fn emit_u32(&mut self, val: u32) {
        assert!(self.remaining() >= 4, "code buffer overflow");
        // SAFETY: bounds checked above.
        unsafe { (self.ptr.add(self.offset) as *mut u32).write_unaligned(val.to_le()) };
        self.offset += 4;
    }

    /// Patch a u16 at the given offset (for back-patching compact branches).
    #[inline]
    pub fn patch_u16(&mut self, offset: usize, val: u16) {
        assert!(offset + 2 <= self.offset, "patch outside emitted code");
        unsafe { (self.ptr.add(offset) as *mut u16).write_unaligned(val.to_le()) };
    }

    /// Patch a u32 at the given offset.
    #[inline]
    pub fn patch_u32(&mut self, offset: usize, val: u32) {
        assert!(offset + 4 <= self.offset, "patch outside emitted code");
        unsafe { (self.ptr.add(offset) as *mut u32).write_unaligned(val.to_le()) };
    }

    /// Read a u16 at the given offset.
    #[inline]
    pub fn read_u16(&self, offset: usize) -> u16 {
        assert!(offset + 2 <= self.offset);
        u16::from_le(unsafe { (self.ptr.add(offset) as *const u16).read_unaligned() })
    }

    /// Read a u32 at the given offset.
    #[inline]
    pub fn read_u32(&self, offset: usize) -> u32 {
        assert!(offset + 4 <= self.offset);
        u32::from_le(unsafe { (self.ptr.add(offset) as *const u32).read_unaligned() })
    }

    // -- Permission management (W^X) --

    /// Make the buffer executable and non-writable.
    pub fn set_executable(&self) -> io::Result<()> {
        self.protect(libc::PROT_READ | libc::PROT_EXEC)
    }

    fn protect(&self, prot: libc::c_int) -> io::Result<()> {
        // SAFETY: ptr/size describe a mapping owned by this buffer.
        let ret = unsafe { libc::mprotect(self.ptr as *mut libc::c_void, self.size, prot) };
        if ret != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    /// Get the generated code as a byte slice (up to current offset).
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr..ptr+offset has been written.
        unsafe { std::slice::from_raw_parts(self.ptr, self.offset) }
    }
}

impl Drop for CodeBuffer {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                libc::munmap(self.ptr as *mut libc::c_void, self.size);
            }
        }
    }
}

fn page_size() -> usize {
    // SAFETY: sysconf is always safe to call.
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}
