//! Facts about the machine that end up in the notebook server config.

use sysinfo::System;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFacts {
    /// Total physical memory in bytes.
    pub total_memory_bytes: u64,
    /// Number of logical CPUs.
    pub cpu_count: usize,
}

impl HostFacts {
    /// Reads total memory and CPU count from the running system.
    pub fn probe() -> Self {
        let mut system = System::new();
        system.refresh_memory();

        let facts = Self {
            total_memory_bytes: system.total_memory(),
            cpu_count: num_cpus::get(),
        };
        debug!(
            total_memory_bytes = facts.total_memory_bytes,
            cpu_count = facts.cpu_count,
            "Probed host facts"
        );
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_reports_nonzero_values() {
        let facts = HostFacts::probe();
        assert!(facts.total_memory_bytes > 0);
        assert!(facts.cpu_count >= 1);
    }
}
