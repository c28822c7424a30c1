use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn thread_count(_pid: u32) -> Option<u32> {
        None
    }
}
