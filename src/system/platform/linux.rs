use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn thread_count(pid: u32) -> Option<u32> {
        // /proc/{pid}/status carries a "Threads:\t<n>" line
        let path = format!("/proc/{pid}/status");
        let contents = std::fs::read_to_string(path).ok()?;
        contents
            .lines()
            .find_map(|line| line.strip_prefix("Threads:"))
            .and_then(|val| val.trim().parse().ok())
    }
}
