use std::io;

const PAGE_SIZE: usize = 4096;

/// An owned region of memory that can hold generated code.
///
/// The region starts out read+write; once the code has been copied in,
/// `protect_exec` flips it to read+execute and it is never written again.
/// Ownership guarantees the mapping is released exactly once, on every exit
/// path, when the value is dropped.
pub struct ExecMem {
    buf: *mut u8,
    len: usize,
}

impl ExecMem {
    /// Maps an anonymous read+write region of at least `len` bytes
    /// (rounded up to whole pages).
    pub fn new(len: usize) -> io::Result<ExecMem> {
        let len = len.max(1).div_ceil(PAGE_SIZE) * PAGE_SIZE;
        let prot = libc::PROT_READ | libc::PROT_WRITE;
        let flags = libc::MAP_ANONYMOUS | libc::MAP_PRIVATE;
        // fd and offset are unused because the mapping is anonymous
        let buf = unsafe {
            libc::mmap(std::ptr::null_mut(), len, prot, flags, -1, 0) as *mut u8
        };
        if buf == libc::MAP_FAILED as *mut u8 {
            Err(io::Error::last_os_error())
        } else {
            Ok(ExecMem { buf, len })
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// The writable view. Only valid before `protect_exec`.
    pub fn slice_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.buf, self.len) }
    }

    /// Drops write access and makes the region executable.
    pub fn protect_exec(&mut self) -> io::Result<()> {
        let res = unsafe { libc::mprotect(self.buf as *mut libc::c_void, self.len, libc::PROT_READ | libc::PROT_EXEC) };
        if res != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    /// Reinterprets the start of the region as a zero-argument function.
    ///
    /// # Safety
    /// The caller must have filled the region with valid machine code for
    /// the running architecture and called `protect_exec`.
    pub unsafe fn as_fn(&self) -> unsafe extern "C" fn() -> i64 {
        unsafe { std::mem::transmute(self.buf) }
    }
}

impl Drop for ExecMem {
    fn drop(&mut self) {
        let res = unsafe { libc::munmap(self.buf as *mut libc::c_void, self.len) };
        if res != 0 {
            panic!(
                "munmap({:?}, {}) failed: {}",
                self.buf,
                self.len,
                io::Error::last_os_error()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_page_size() {
        let mem = ExecMem::new(1).unwrap();
        assert_eq!(mem.len(), PAGE_SIZE);
        let mem = ExecMem::new(PAGE_SIZE + 1).unwrap();
        assert_eq!(mem.len(), 2 * PAGE_SIZE);
    }

    #[test]
    fn write_then_execute() {
        let code = &[
            0x48, 0xc7, 0xc0, 0x37, 0x00, 0x00, 0x00, // mov rax, 0x37
            0xc3, // ret
        ];
        let mut mem = ExecMem::new(code.len()).unwrap();
        mem.slice_mut()[..code.len()].copy_from_slice(code);
        mem.protect_exec().unwrap();

        let func = unsafe { mem.as_fn() };
        let res = unsafe { func() };
        assert_eq!(res, 55);
    }
}
