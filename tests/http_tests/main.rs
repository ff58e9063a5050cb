//! HTTP test harness
