use std::collections::HashMap;

pub trait PlatformExtensions {
    fn thread_count(pid: u32) -> Option<u32>;

    /// Thread counts for a whole sample. Platforms that can only enumerate
    /// every process at once override this to do it a single time.
    fn thread_counts(pids: &[u32]) -> HashMap<u32, u32> {
        pids.iter()
            .filter_map(|&pid| Some((pid, Self::thread_count(pid)?)))
            .collect()
    }
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
mod unsupported;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
use unsupported as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn thread_count(pid: u32) -> Option<u32> {
    platform_impl::Platform::thread_count(pid)
}

pub fn thread_counts(pids: &[u32]) -> HashMap<u32, u32> {
    platform_impl::Platform::thread_counts(pids)
}
