pub mod stats_report_job;
