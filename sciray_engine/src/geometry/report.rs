/// ReportData - simulation values per primitive and per frame

use crate::engine_err;
use crate::error::Result;
use crate::model::Component;

#[derive(Debug, Clone)]
pub struct ReportData {
    /// Simulation frame of `frames[0]`
    start_frame: u32,
    /// One value per primitive, per frame
    frames: Vec<Vec<f32>>,
    unit: String,
    /// Frame index whose colors are currently applied
    applied_frame: Option<usize>,
}

impl ReportData {
    /// Fails with InvalidArgument if frames do not all hold the same number
    /// of values
    pub fn new(start_frame: u32, frames: Vec<Vec<f32>>, unit: impl Into<String>) -> Result<Self> {
        if let Some(first) = frames.first() {
            if let Some(index) = frames.iter().position(|frame| frame.len() != first.len()) {
                return Err(engine_err!("sciray::ReportData", InvalidArgument =>
                    "Report frame {} holds {} values, expected {}", index, frames[index].len(), first.len()));
            }
        }
        Ok(Self { start_frame, frames, unit: unit.into(), applied_frame: None })
    }

    pub fn start_frame(&self) -> u32 {
        self.start_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Values per frame
    pub fn value_count(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Report frame shown at simulation frame `frame` (clamped to the report)
    pub fn frame_index(&self, frame: u32) -> Option<usize> {
        if self.frames.is_empty() {
            return None;
        }
        let index = frame.saturating_sub(self.start_frame) as usize;
        Some(index.min(self.frames.len() - 1))
    }

    pub fn values(&self, index: usize) -> Option<&[f32]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    pub fn applied_frame(&self) -> Option<usize> {
        self.applied_frame
    }

    pub(crate) fn set_applied_frame(&mut self, index: Option<usize>) {
        self.applied_frame = index;
    }
}

impl Component for ReportData {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_index_is_clamped() {
        let report = ReportData::new(10, vec![vec![0.0; 2]; 3], "mV").unwrap();
        assert_eq!(report.frame_index(0), Some(0));
        assert_eq!(report.frame_index(11), Some(1));
        assert_eq!(report.frame_index(100), Some(2));
        assert_eq!(report.value_count(), 2);
        assert_eq!(ReportData::new(0, vec![], "").unwrap().frame_index(0), None);
    }

    #[test]
    fn test_ragged_frames_rejected() {
        assert!(ReportData::new(0, vec![vec![0.0; 2], vec![0.0; 3]], "mV").is_err());
    }
}
