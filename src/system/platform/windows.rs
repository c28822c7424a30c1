use std::collections::HashMap;

use super::PlatformExtensions;

use windows_sys::Win32::Foundation::{CloseHandle, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW, TH32CS_SNAPPROCESS,
};

pub struct Platform;

/// One toolhelp snapshot of every process, mapped pid -> cntThreads.
fn snapshot_thread_counts() -> HashMap<u32, u32> {
    let mut counts = HashMap::new();
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
        if snapshot == INVALID_HANDLE_VALUE {
            return counts;
        }
        let mut entry = std::mem::zeroed::<PROCESSENTRY32W>();
        entry.dwSize = std::mem::size_of::<PROCESSENTRY32W>() as u32;

        let mut ok = Process32FirstW(snapshot, &mut entry);
        while ok != 0 {
            counts.insert(entry.th32ProcessID, entry.cntThreads);
            ok = Process32NextW(snapshot, &mut entry);
        }
        CloseHandle(snapshot);
    }
    counts
}

impl PlatformExtensions for Platform {
    fn thread_count(pid: u32) -> Option<u32> {
        snapshot_thread_counts().get(&pid).copied()
    }

    // May carry pids beyond those asked for; callers look up by pid.
    fn thread_counts(_pids: &[u32]) -> HashMap<u32, u32> {
        snapshot_thread_counts()
    }
}
