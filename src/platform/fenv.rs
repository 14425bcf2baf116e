// ── Floating-point environment ────────────────────────────────────────────────
//
// IEEE 754 wants non-stop mode by default and the downstream numeric code
// relies on it, but FreeBSD on x86 (i386 and amd64) has historically started
// processes with the overflow trap enabled. Setting the overflow *mask* bit
// turns the trap off; every other bit is left alone.
//
// The other FreeBSD architectures (aarch64, armv7, powerpc, riscv64) start
// with all FP exception traps disabled, and on most of their cores trapping
// is not implemented in hardware at all, so there is nothing to clear there.
// The same holds for every other OS.

#![allow(unsafe_code)]
#![cfg_attr(
    not(all(target_os = "freebsd", any(target_arch = "x86_64", target_arch = "x86"))),
    allow(dead_code)
)]

/// MXCSR OM: overflow exception masked.
const MXCSR_OVERFLOW_MASK: u32 = 1 << 10;

/// x87 control word OM: overflow exception masked.
const X87_OVERFLOW_MASK: u16 = 1 << 3;

/// `csr` with the SSE overflow trap disabled.
pub(crate) fn mxcsr_without_overflow_trap(csr: u32) -> u32 {
    csr | MXCSR_OVERFLOW_MASK
}

/// `cw` with the x87 overflow trap disabled.
pub(crate) fn x87_without_overflow_trap(cw: u16) -> u16 {
    cw | X87_OVERFLOW_MASK
}

/// Disable the floating-point overflow trap for this thread.
#[cfg(all(target_os = "freebsd", any(target_arch = "x86_64", target_arch = "x86")))]
pub(crate) fn clear_overflow_trap() {
    clear_x87_overflow_trap();
    #[cfg(any(target_arch = "x86_64", target_feature = "sse"))]
    clear_sse_overflow_trap();
    log::debug!("floating-point overflow trap disabled");
}

/// Nothing to do: the process already starts in non-stop mode.
#[cfg(not(all(target_os = "freebsd", any(target_arch = "x86_64", target_arch = "x86"))))]
pub(crate) fn clear_overflow_trap() {}

/// The x87 unit is present on every i386 and amd64 CPU.
#[cfg(all(target_os = "freebsd", any(target_arch = "x86_64", target_arch = "x86")))]
fn clear_x87_overflow_trap() {
    use std::arch::asm;

    let mut cw: u16 = 0;
    // SAFETY: fnstcw stores the 16-bit x87 control word into the local.
    unsafe {
        asm!("fnstcw [{}]", in(reg) std::ptr::addr_of_mut!(cw), options(nostack, preserves_flags));
    }
    let cw = x87_without_overflow_trap(cw);
    // SAFETY: only the OM bit differs from the value just read.
    unsafe {
        asm!("fldcw [{}]", in(reg) std::ptr::addr_of!(cw), options(nostack, readonly, preserves_flags));
    }
}

/// MXCSR exists wherever SSE does: always on amd64, on i386 only when the
/// target enables it.
#[cfg(all(
    target_os = "freebsd",
    any(target_arch = "x86_64", all(target_arch = "x86", target_feature = "sse"))
))]
fn clear_sse_overflow_trap() {
    use std::arch::asm;

    let mut csr: u32 = 0;
    // SAFETY: stmxcsr stores the 32-bit MXCSR into the local; the cfg above
    // guarantees SSE is available.
    unsafe {
        asm!("stmxcsr [{}]", in(reg) std::ptr::addr_of_mut!(csr), options(nostack, preserves_flags));
    }
    let csr = mxcsr_without_overflow_trap(csr);
    // SAFETY: only the OM bit differs from the value just read.
    unsafe {
        asm!("ldmxcsr [{}]", in(reg) std::ptr::addr_of!(csr), options(nostack, readonly, preserves_flags));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mxcsr_already_masked() {
        // Power-on MXCSR masks every exception.
        assert_eq!(mxcsr_without_overflow_trap(0x1F80), 0x1F80);
    }

    #[test]
    fn mxcsr_unmasked_overflow_gets_masked() {
        let trapping = 0x1F80 & !MXCSR_OVERFLOW_MASK;
        assert_eq!(mxcsr_without_overflow_trap(trapping), 0x1F80);
    }

    #[test]
    fn mxcsr_other_traps_untouched() {
        // Invalid-operation (IM, bit 7) and divide-by-zero (ZM, bit 9) unmasked.
        let csr = 0x1F80 & !(1 << 7) & !(1 << 9) & !MXCSR_OVERFLOW_MASK;
        let out = mxcsr_without_overflow_trap(csr);
        assert_eq!(out & (1 << 7), 0);
        assert_eq!(out & (1 << 9), 0);
        assert_ne!(out & MXCSR_OVERFLOW_MASK, 0);
    }

    #[test]
    fn x87_overflow_gets_masked() {
        // FreeBSD's historical __INITIAL_NPXCW__ left some traps enabled.
        let cw: u16 = 0x037F & !X87_OVERFLOW_MASK;
        assert_eq!(x87_without_overflow_trap(cw), 0x037F);
    }

    #[test]
    fn x87_other_bits_untouched() {
        // Precision control (bits 8-9) and rounding control (bits 10-11).
        let cw: u16 = 0x0F72;
        let out = x87_without_overflow_trap(cw);
        assert_eq!(out & !X87_OVERFLOW_MASK, cw & !X87_OVERFLOW_MASK);
        assert_ne!(out & X87_OVERFLOW_MASK, 0);
    }

    #[test]
    fn clearing_is_harmless_on_this_host() {
        clear_overflow_trap();
        assert!((f64::MAX * 2.0).is_infinite());
    }
}
