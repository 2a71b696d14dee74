//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Material preset the session ran with.
    pub material: String,
    /// Control node count.
    pub node_count: usize,
    /// Render mesh vertex count.
    pub vertex_count: usize,
    /// Frames executed.
    pub frames: u32,
    /// Total wall-clock time, including pin edits and skinning (seconds).
    pub total_wall_time: f64,
    /// Average solve time per frame (seconds).
    pub avg_frame_time: f64,
    /// Minimum frame time.
    pub min_frame_time: f64,
    /// Maximum frame time.
    pub max_frame_time: f64,
    /// Average CG iterations per frame, summed over both channels and all
    /// ARAP passes.
    pub avg_cg_iterations: f64,
    /// Worst pin error after the last frame.
    pub final_pin_error: f64,
    /// Largest node displacement from rest after the last frame.
    pub max_displacement: f64,
}

impl BenchmarkMetrics {
    /// Format as a CSV row (header + data).
    pub fn to_csv_header() -> String {
        "scenario,material,node_count,vertex_count,frames,total_wall_time_s,avg_frame_ms,min_frame_ms,max_frame_ms,avg_cg_iterations,final_pin_error,max_displacement".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.1},{:.6},{:.6}",
            self.scenario,
            self.material,
            self.node_count,
            self.vertex_count,
            self.frames,
            self.total_wall_time,
            self.avg_frame_time * 1000.0,
            self.min_frame_time * 1000.0,
            self.max_frame_time * 1000.0,
            self.avg_cg_iterations,
            self.final_pin_error,
            self.max_displacement,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
