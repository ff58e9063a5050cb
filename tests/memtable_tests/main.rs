//! MemTable test harness
