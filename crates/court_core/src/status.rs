//! Presentation snapshot of a session.
//!
//! [`StatusView`] is what a renderer needs for one paint: status text, which
//! controls are enabled, the result panel and every position on the court.

use serde::Serialize;

use crate::models::{BallPosition, Entity, MatchDescriptor};
use crate::playback::{LastResult, PlaybackController, PlaybackState, Scheduler, StateKind};

pub const FIND_LABEL: &str = "FIND BEST PLAY";
pub const SEARCHING_LABEL: &str = "Finding...";
pub const PLAYING_LABEL: &str = "Playing...";

/// Match result as shown in the popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPanel {
    pub match_id: String,
    pub event_id: String,
    pub similarity: String,
    pub quality: String,
    pub similar_count: Option<u32>,
    pub visible: bool,
    /// `(frames shown, total)` while playing
    pub progress: Option<(usize, usize)>,
}

impl ResultPanel {
    fn new(descriptor: &MatchDescriptor, visible: bool, progress: Option<(usize, usize)>) -> Self {
        Self {
            match_id: descriptor.match_id.clone(),
            event_id: descriptor.event_id.clone(),
            similarity: descriptor.similarity_percent(),
            quality: descriptor.quality_percent(),
            similar_count: descriptor.similar_count,
            visible,
            progress,
        }
    }

    /// Popup footer line.
    pub fn progress_line(&self) -> String {
        match self.progress {
            Some((shown, total)) => format!("Playing animation... ({shown}/{total})"),
            None => "Animation will play on court...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastResultView {
    pub match_id: String,
    pub similarity: String,
    pub received_at: String,
}

impl From<&LastResult> for LastResultView {
    fn from(last: &LastResult) -> Self {
        Self {
            match_id: last.descriptor.match_id.clone(),
            similarity: last.descriptor.similarity_percent(),
            received_at: last.received_at.to_rfc3339(),
        }
    }
}

/// Owned snapshot of everything on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub state: PlaybackState,
    pub status_line: String,
    pub busy: bool,
    pub find_enabled: bool,
    pub drag_enabled: bool,
    pub stop_enabled: bool,
    pub button_label: &'static str,
    pub result_panel: Option<ResultPanel>,
    pub last_result: Option<LastResultView>,
    pub entities: Vec<Entity>,
    pub ball: BallPosition,
}

impl StatusView {
    pub fn project<S: Scheduler>(controller: &PlaybackController<S>) -> Self {
        let state = controller.state().clone();
        let progress = controller.progress();
        let store = controller.store();

        let status_line = match (controller.message(), progress) {
            (Some(message), _) => message.to_string(),
            (None, Some((shown, total))) => format!("Frame {shown}/{total}"),
            (None, None) => format!("{} players positioned", store.entities().len()),
        };

        let button_label = match state.kind() {
            StateKind::Searching | StateKind::AwaitingSequence => SEARCHING_LABEL,
            StateKind::Playing => PLAYING_LABEL,
            _ => FIND_LABEL,
        };

        Self {
            status_line,
            busy: state.is_busy(),
            find_enabled: state.is_idle(),
            drag_enabled: state.is_idle(),
            stop_enabled: state.is_busy(),
            button_label,
            result_panel: controller
                .descriptor()
                .map(|d| ResultPanel::new(d, controller.result_visible(), progress)),
            last_result: controller.last_result().map(LastResultView::from),
            entities: store.entities().to_vec(),
            ball: store.ball(),
            state,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaybackConfig;
    use crate::models::{EntityId, Frame, FrameSequence, Position};
    use crate::store::EntityStore;
    use std::time::Duration;

    fn controller() -> PlaybackController {
        let timing = PlaybackConfig { fetch_delay: Duration::ZERO, ..Default::default() };
        PlaybackController::new(EntityStore::default(), timing)
    }

    fn sequence(len: usize, roster: &[EntityId]) -> FrameSequence {
        let frames = (0..len)
            .map(|i| {
                roster.iter().fold(Frame::new(BallPosition::new(0.0, 0.0, 1.0)), |f, id| {
                    f.with_entity(*id, Position::new(i as f32, i as f32))
                })
            })
            .collect();
        FrameSequence::for_roster(frames, None, roster).unwrap()
    }

    #[test]
    fn test_idle_view() {
        let view = StatusView::project(&controller());
        assert_eq!(view.status_line, "10 players positioned");
        assert!(view.find_enabled && view.drag_enabled);
        assert!(!view.stop_enabled && !view.busy);
        assert_eq!(view.button_label, FIND_LABEL);
        assert!(view.result_panel.is_none());
        assert_eq!(view.entities.len(), 10);
    }

    #[test]
    fn test_searching_view() {
        let mut c = controller();
        c.start_search(Duration::ZERO);
        let view = StatusView::project(&c);

        assert_eq!(view.status_line, "Finding best play...");
        assert_eq!(view.button_label, SEARCHING_LABEL);
        assert!(view.busy && view.stop_enabled);
        assert!(!view.find_enabled && !view.drag_enabled);
    }

    #[test]
    fn test_playing_view_shows_result_panel() {
        let mut c = controller();
        let req = c.start_search(Duration::ZERO).unwrap();
        let descriptor = MatchDescriptor::new("G1", "E1", 0.87, 0.62).with_similar_count(3);
        let fetch = c.on_match_result(req.ticket, Ok(descriptor), Duration::ZERO).unwrap();
        c.on_sequence_result(fetch.ticket, Ok(sequence(4, &fetch.roster)), Duration::ZERO);
        c.advance(Duration::from_millis(50));

        let view = StatusView::project(&c);
        assert_eq!(view.button_label, PLAYING_LABEL);
        assert_eq!(view.status_line, "Playing: 4 frames from recorded game");

        let panel = view.result_panel.expect("panel while playing");
        assert_eq!(panel.similarity, "87.0%");
        assert_eq!(panel.quality, "62.0%");
        assert_eq!(panel.similar_count, Some(3));
        assert!(panel.visible);
        assert_eq!(panel.progress, Some((2, 4)));
        assert_eq!(panel.progress_line(), "Playing animation... (2/4)");

        let last = view.last_result.expect("last result recorded");
        assert_eq!(last.match_id, "G1");
    }

    #[test]
    fn test_complete_then_idle_view() {
        let mut c = controller();
        let req = c.start_search(Duration::ZERO).unwrap();
        let fetch = c
            .on_match_result(req.ticket, Ok(MatchDescriptor::new("G1", "E1", 0.5, 0.5)), Duration::ZERO)
            .unwrap();
        c.on_sequence_result(fetch.ticket, Ok(sequence(1, &fetch.roster)), Duration::ZERO);
        c.advance(Duration::from_millis(50));

        let view = StatusView::project(&c);
        assert_eq!(view.status_line, "Animation complete!");
        assert!(!view.find_enabled, "still disabled until reset");
        assert_eq!(view.button_label, FIND_LABEL);

        c.advance(Duration::from_millis(2_050));
        let view = StatusView::project(&c);
        assert_eq!(view.status_line, "10 players positioned");
        assert!(view.find_enabled);
        assert_eq!(view.result_panel.map(|p| p.progress_line()).as_deref(), Some("Animation will play on court..."));
    }
}
