/// Resident set size of the current process in gigabytes, used for RAM-hours
/// accounting in long evaluation runs. Returns `None` on unsupported
/// platforms or when the probe fails.
#[inline]
pub fn current_rss_gb() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        linux_rss_gb()
    }

    #[cfg(target_os = "macos")]
    {
        macos_rss_gb()
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

#[cfg(target_os = "linux")]
fn linux_rss_gb() -> Option<f64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    parse_statm_rss_gb(&statm, page_size_bytes())
}

#[cfg(target_os = "linux")]
fn page_size_bytes() -> u64 {
    // sysconf would be exact; 4 KiB pages hold on every target we run on.
    4096
}

#[cfg(target_os = "linux")]
fn parse_statm_rss_gb(statm: &str, page_size: u64) -> Option<f64> {
    // /proc/self/statm: size resident shared text lib data dt (in pages)
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(resident_pages as f64 * page_size as f64 / (1024.0 * 1024.0 * 1024.0))
}

#[cfg(target_os = "macos")]
fn macos_rss_gb() -> Option<f64> {
    use mach2::kern_return::KERN_SUCCESS;
    use mach2::message::mach_msg_type_number_t;
    use mach2::task::task_info;
    use mach2::task_info::{MACH_TASK_BASIC_INFO, MACH_TASK_BASIC_INFO_COUNT, mach_task_basic_info};
    use mach2::traps::mach_task_self;

    unsafe {
        let mut info: mach_task_basic_info = std::mem::zeroed();
        let mut count: mach_msg_type_number_t = MACH_TASK_BASIC_INFO_COUNT;
        let kr = task_info(
            mach_task_self(),
            MACH_TASK_BASIC_INFO,
            &mut info as *mut _ as *mut _,
            &mut count,
        );
        if kr == KERN_SUCCESS {
            return Some(info.resident_size as f64 / (1024.0 * 1024.0 * 1024.0));
        }
    }
    None
}
