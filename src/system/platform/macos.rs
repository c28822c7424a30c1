use libproc::libproc::proc_pid::pidinfo;
use libproc::libproc::task_info::TaskInfo;

use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn thread_count(pid: u32) -> Option<u32> {
        let info = pidinfo::<TaskInfo>(pid as i32, 0).ok()?;
        u32::try_from(info.pti_threadnum).ok()
    }
}
