//! Learn-then-infer consumer
//!
//! The first `learning_target` captures train the model. Every capture after
//! that is scored, and the score decides between an anomaly and a nominal
//! signal. There is no way back to learning short of building a new
//! controller.

use crate::acquisition::{StreamControl, TriggerConsumer};
use crate::capture::CaptureBuffer;
use crate::error::{CaptureError, Result};
use crate::model::AnomalyModel;
use crate::status::{StatusIndicator, StatusKind};
use crate::transport::Transport;
use tracing::{info, warn};

/// Which half of the run the controller is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Learning,
    Inferring,
}

/// What a single capture did to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    Learned {
        count: u32,
        percent: u32,
        /// This iteration completed the learning phase
        finished: bool,
    },
    Scored {
        similarity: u8,
        anomaly: bool,
    },
}

pub struct LearnDetectController<M, T, I> {
    model: M,
    transport: T,
    indicator: I,
    learning_target: u32,
    thresh_similarity: u8,
    learn_count: u32,
    phase: Phase,
    last_event: Option<ControllerEvent>,
}

impl<M, T, I> LearnDetectController<M, T, I>
where
    M: AnomalyModel,
    T: Transport,
    I: StatusIndicator,
{
    /// Initialise the model and start in the learning phase
    pub fn new(
        mut model: M,
        transport: T,
        indicator: I,
        learning_target: u32,
        thresh_similarity: u8,
    ) -> Result<Self> {
        if learning_target == 0 {
            return Err(CaptureError::InvalidParameter(
                "Learning target must be at least 1 iteration".to_string(),
            ));
        }
        model.initialize()?;

        Ok(Self {
            model,
            transport,
            indicator,
            learning_target,
            thresh_similarity,
            learn_count: 0,
            phase: Phase::Learning,
            last_event: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Completed learning iterations, never more than the target
    pub fn learn_count(&self) -> u32 {
        self.learn_count
    }

    pub fn last_event(&self) -> Option<ControllerEvent> {
        self.last_event
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Feed one captured buffer through the current phase
    pub fn process(&mut self, buffer: &CaptureBuffer) -> Result<ControllerEvent> {
        let event = match self.phase {
            Phase::Learning => self.learn(buffer)?,
            Phase::Inferring => self.infer(buffer)?,
        };
        self.last_event = Some(event);
        Ok(event)
    }

    fn learn(&mut self, buffer: &CaptureBuffer) -> Result<ControllerEvent> {
        self.model.learn(buffer)?;
        self.learn_count += 1;

        let percent = self.learn_count * 100 / self.learning_target;
        self.transport.emit(&format!("{}\n", percent))?;
        self.indicator.signal(StatusKind::Learned)?;
        info!(count = self.learn_count, target = self.learning_target, percent, "learned");

        let finished = self.learn_count >= self.learning_target;
        if finished {
            self.indicator.signal(StatusKind::LearningComplete)?;
            self.phase = Phase::Inferring;
            info!(iterations = self.learn_count, "learning complete, switching to inference");
        }

        Ok(ControllerEvent::Learned {
            count: self.learn_count,
            percent,
            finished,
        })
    }

    fn infer(&mut self, buffer: &CaptureBuffer) -> Result<ControllerEvent> {
        let similarity = self.model.detect(buffer)?;
        self.transport.emit(&format!("{}\n", similarity))?;

        let anomaly = similarity < self.thresh_similarity;
        if anomaly {
            warn!(similarity, threshold = self.thresh_similarity, "anomaly detected");
            self.indicator.signal(StatusKind::Anomaly)?;
        } else {
            info!(similarity, "nominal");
            self.indicator.signal(StatusKind::Nominal)?;
        }

        Ok(ControllerEvent::Scored {
            similarity,
            anomaly,
        })
    }
}

impl<M, T, I> TriggerConsumer for LearnDetectController<M, T, I>
where
    M: AnomalyModel,
    T: Transport,
    I: StatusIndicator,
{
    fn on_trigger(&mut self, buffer: &CaptureBuffer) -> Result<StreamControl> {
        self.process(buffer)?;
        Ok(StreamControl::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Model that replays a fixed list of scores and counts calls
    #[derive(Default)]
    struct FixedScores {
        scores: Vec<u8>,
        initialized: bool,
        learns: u32,
        detects: usize,
    }

    impl AnomalyModel for FixedScores {
        fn initialize(&mut self) -> Result<()> {
            self.initialized = true;
            Ok(())
        }

        fn learn(&mut self, _buffer: &CaptureBuffer) -> Result<()> {
            self.learns += 1;
            Ok(())
        }

        fn detect(&mut self, _buffer: &CaptureBuffer) -> Result<u8> {
            let score = self.scores.get(self.detects).copied().unwrap_or(100);
            self.detects += 1;
            Ok(score)
        }
    }

    type Controller = LearnDetectController<FixedScores, Vec<String>, Vec<StatusKind>>;

    fn controller(target: u32, scores: Vec<u8>) -> Controller {
        let model = FixedScores {
            scores,
            ..FixedScores::default()
        };
        LearnDetectController::new(model, Vec::new(), Vec::new(), target, 90).unwrap()
    }

    #[test]
    fn test_new_initializes_model() {
        let c = controller(3, vec![]);
        assert!(c.model().initialized);
        assert_eq!(c.phase(), Phase::Learning);
        assert_eq!(c.learn_count(), 0);
    }

    #[test]
    fn test_zero_target_rejected() {
        let result = LearnDetectController::new(
            FixedScores::default(),
            Vec::<String>::new(),
            Vec::<StatusKind>::new(),
            0,
            90,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_transitions_exactly_once_after_target() {
        let mut c = controller(5, vec![]);
        let buffer = CaptureBuffer::new(4);

        for i in 1..=4 {
            c.process(&buffer).unwrap();
            assert_eq!(c.phase(), Phase::Learning, "switched early at {}", i);
        }
        let event = c.process(&buffer).unwrap();
        assert_eq!(
            event,
            ControllerEvent::Learned {
                count: 5,
                percent: 100,
                finished: true
            }
        );
        assert_eq!(c.phase(), Phase::Inferring);

        for _ in 0..10 {
            c.process(&buffer).unwrap();
        }
        assert_eq!(c.learn_count(), 5);
        assert_eq!(c.model().learns, 5);
        assert_eq!(c.model().detects, 10);

        let completions = c
            .indicator()
            .iter()
            .filter(|&&k| k == StatusKind::LearningComplete)
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_progress_lines() {
        let mut c = controller(5, vec![]);
        let buffer = CaptureBuffer::new(1);
        for _ in 0..5 {
            c.process(&buffer).unwrap();
        }
        assert_eq!(c.transport(), &vec!["20\n", "40\n", "60\n", "80\n", "100\n"]);
    }

    #[test]
    fn test_progress_rounds_down() {
        let mut c = controller(3, vec![]);
        let buffer = CaptureBuffer::new(1);
        for _ in 0..3 {
            c.process(&buffer).unwrap();
        }
        assert_eq!(c.transport(), &vec!["33\n", "66\n", "100\n"]);
    }

    #[test]
    fn test_learning_signals_in_order() {
        let mut c = controller(2, vec![]);
        let buffer = CaptureBuffer::new(1);
        c.process(&buffer).unwrap();
        c.process(&buffer).unwrap();
        assert_eq!(
            c.indicator(),
            &vec![
                StatusKind::Learned,
                StatusKind::Learned,
                StatusKind::LearningComplete
            ]
        );
    }

    #[test]
    fn test_similarity_boundary() {
        let mut c = controller(1, vec![89, 90, 0, 100]);
        let buffer = CaptureBuffer::new(1);
        c.process(&buffer).unwrap();

        let events: Vec<_> = (0..4).map(|_| c.process(&buffer).unwrap()).collect();
        assert_eq!(
            events,
            vec![
                ControllerEvent::Scored { similarity: 89, anomaly: true },
                ControllerEvent::Scored { similarity: 90, anomaly: false },
                ControllerEvent::Scored { similarity: 0, anomaly: true },
                ControllerEvent::Scored { similarity: 100, anomaly: false },
            ]
        );
        assert_eq!(
            &c.indicator()[2..],
            &[
                StatusKind::Anomaly,
                StatusKind::Nominal,
                StatusKind::Anomaly,
                StatusKind::Nominal
            ]
        );
        assert_eq!(&c.transport()[1..], &["89\n", "90\n", "0\n", "100\n"]);
    }
}
