use chrono::{DateTime, TimeZone, Utc};
use queuedeck_core::{elapsed_secs, format_bytes, format_bytes_with, Job, ProgressFraction};
use serde_json::json;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn job_with_tasks(tasks: serde_json::Value) -> Job {
    serde_json::from_value(json!({
        "job_id": "job-1",
        "status": "Processing",
        "created_at": "2024-03-01T10:00:00Z",
        "finished_at": null,
        "tasks": tasks,
        "progress": {},
        "url": "https://video.example/watch?v=1",
        "format": "mp3",
        "title": "A video",
        "thumbnail": ""
    }))
    .expect("job decodes")
}

fn task(id: &str, kind: &str, status: &str) -> serde_json::Value {
    json!({
        "task_id": id,
        "kind": kind,
        "status": status,
        "created_at": "2024-03-01T10:00:00Z",
        "finished_at": null,
        "url": "https://video.example/watch?v=1",
        "title": "A video",
        "thumbnail": "",
        "format": "mp3",
        "owner_job_id": "job-1",
        "prioritized": false
    })
}

#[test]
fn progress_ignores_fetch_metadata_task() {
    let job = job_with_tasks(json!([
        task("t0", "FetchUrlContents", "Done"),
        task("t1", "DownloadAndConvert", "Done"),
        task("t2", "DownloadAndConvert", "Processing"),
        task("t3", "DownloadAndConvert", "Failed"),
    ]));
    assert_eq!(job.progress_fraction(), ProgressFraction { done: 1, total: 3 });
}

#[test]
fn only_fetch_metadata_task_yields_zero_over_zero() {
    let job = job_with_tasks(json!([task("t0", "FetchUrlContents", "Done")]));
    assert_eq!(job.progress_fraction(), ProgressFraction { done: 0, total: 0 });

    let empty = job_with_tasks(json!([]));
    assert_eq!(empty.progress_fraction(), ProgressFraction { done: 0, total: 0 });
}

#[test]
fn task_indices_put_fetch_metadata_at_zero() {
    let job = job_with_tasks(json!([
        task("t0", "FetchUrlContents", "Done"),
        task("t1", "DownloadAndConvert", "Done"),
        task("t2", "DownloadAndConvert", "Waiting"),
    ]));
    assert_eq!(job.task_indices(), vec![0, 1, 2]);
}

#[test]
fn elapsed_uses_finished_at_regardless_of_now() {
    assert_eq!(elapsed_secs(at(0), Some(at(5)), at(10_000)), 5);
    assert_eq!(elapsed_secs(at(0), Some(at(5)), at(-10_000)), 5);
}

#[test]
fn elapsed_runs_against_now_until_finished() {
    assert_eq!(elapsed_secs(at(0), None, at(42)), 42);
    let half_second = at(3) + chrono::Duration::milliseconds(999);
    assert_eq!(elapsed_secs(at(0), None, half_second), 3);
}

#[test]
fn elapsed_clamps_clock_skew_to_zero() {
    assert_eq!(elapsed_secs(at(10), None, at(4)), 0);
}

#[test]
fn job_progress_map_is_keyed_by_task_id() {
    let mut value = serde_json::to_value(job_with_tasks(json!([task(
        "t1",
        "DownloadAndConvert",
        "Processing"
    )])))
    .unwrap();
    value["progress"] = json!({
        "t1": { "percent": 40, "bytes_estimate": 2048, "bytes_downloaded": 819 }
    });
    let job: Job = serde_json::from_value(value).unwrap();
    let progress = job
        .task_progress(&queuedeck_core::TaskId::new("t1"))
        .expect("progress present");
    assert_eq!(progress.percent, 40);
    assert_eq!(progress.bytes_downloaded, 819);
}

#[test]
fn format_bytes_matches_reference_values() {
    assert_eq!(format_bytes(0), "0 Bytes");
    assert_eq!(format_bytes(1), "1 Bytes");
    assert_eq!(format_bytes(1023), "1023 Bytes");
    assert_eq!(format_bytes(1024), "1 KiB");
    assert_eq!(format_bytes(1536), "1.5 KiB");
    assert_eq!(format_bytes(1_048_576), "1 MiB");
    assert_eq!(format_bytes(5_368_709_120), "5 GiB");
    assert_eq!(format_bytes(1_234_567), "1.18 MiB");
}

#[test]
fn format_bytes_respects_decimals() {
    assert_eq!(format_bytes_with(1_234_567, 0), "1 MiB");
    assert_eq!(format_bytes_with(1_234_567, 4), "1.1774 MiB");
}

#[test]
fn format_bytes_handles_the_largest_counts() {
    assert_eq!(format_bytes(u64::MAX), "16 EiB");
}
