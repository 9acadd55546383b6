use super::config::IterationMode;

#[derive(Debug, Clone)]
pub enum Progress {
    SearchStart {
        mode: IterationMode,
        num_workers: usize,
    },
    WorkerFinish {
        worker_id: usize,
        iterations: u64,
        elapsed_micros: u64,
    },
    SearchFinish {
        num_candidates: usize,
    },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
