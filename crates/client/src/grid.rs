//! Client grid roster.
//!
//! Tracks how many client widgets are on screen. The count only moves one
//! step at a time and never goes below zero; the roster always holds exactly
//! `count` widgets, each independently instantiated.

use uuid::Uuid;

/// One client slot in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientWidget {
    id: Uuid,
    label: String,
}

impl ClientWidget {
    fn new(index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: format!("Client {}", index + 1),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A dynamic roster of client widgets.
#[derive(Debug, Default)]
pub struct ClientGrid {
    widgets: Vec<ClientWidget>,
}

impl ClientGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.widgets.len()
    }

    /// Add one client widget to the grid.
    pub fn add_client(&mut self) {
        let widget = ClientWidget::new(self.widgets.len());
        self.widgets.push(widget);
    }

    /// Remove the most recently added widget. Floored at zero.
    pub fn remove_client(&mut self) {
        self.widgets.pop();
    }

    pub fn widgets(&self) -> &[ClientWidget] {
        &self.widgets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_tracks_net_additions() {
        let mut grid = ClientGrid::new();
        grid.add_client();
        grid.add_client();
        grid.add_client();
        grid.remove_client();
        assert_eq!(grid.count(), 2);
        assert_eq!(grid.widgets().len(), 2);
    }

    #[test]
    fn remove_on_empty_grid_floors_at_zero() {
        let mut grid = ClientGrid::new();
        grid.remove_client();
        grid.remove_client();
        assert_eq!(grid.count(), 0);

        grid.add_client();
        grid.remove_client();
        grid.remove_client();
        assert_eq!(grid.count(), 0);
    }

    #[test]
    fn widgets_are_independently_instantiated() {
        let mut grid = ClientGrid::new();
        grid.add_client();
        grid.add_client();
        let ids: Vec<_> = grid.widgets().iter().map(ClientWidget::id).collect();
        assert_ne!(ids[0], ids[1]);
        assert_eq!(grid.widgets()[0].label(), "Client 1");
        assert_eq!(grid.widgets()[1].label(), "Client 2");
    }

    #[test]
    fn mixed_sequences_never_go_negative() {
        let mut grid = ClientGrid::new();
        let steps = [1, -1, -1, 1, 1, -1, 1, 1, -1, -1, -1, 1];
        let mut expected = 0i32;
        for step in steps {
            if step > 0 {
                grid.add_client();
            } else {
                grid.remove_client();
            }
            expected = (expected + step).max(0);
            assert_eq!(grid.count() as i32, expected);
        }
    }
}
