//! Title projection onto registered panels

use crate::registry::PanelRegistry;

/// Set the label of each panel from the title at its ordinal.
///
/// Titles past the last panel are ignored; panels past the last title keep
/// their current label. Returns the ordinals whose label actually changed,
/// so applying the same sequence twice reports nothing the second time.
pub fn project_titles<V>(registry: &mut PanelRegistry<V>, titles: &[String]) -> Vec<usize> {
    titles
        .iter()
        .enumerate()
        .filter_map(|(ordinal, title)| {
            let panel = registry.get_mut(ordinal)?;
            panel.set_label(title).then_some(ordinal)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChildId;
    use crate::panel::{PanelWrapper, Ticket};

    fn registry(count: usize) -> PanelRegistry<()> {
        let mut registry = PanelRegistry::new();
        for i in 0..count {
            let panel = PanelWrapper::new(ChildId::new(format!("c{i}")), format!("Page {i}"), Ticket(i as u64));
            registry.insert_at(i, panel);
        }
        registry
    }

    fn labels(registry: &PanelRegistry<()>) -> Vec<&str> {
        registry.iter().map(|p| p.label()).collect()
    }

    fn titles(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_short_sequence_leaves_tail() {
        let mut registry = registry(3);
        let changed = project_titles(&mut registry, &titles(&["X", "Y"]));

        assert_eq!(changed, vec![0, 1]);
        assert_eq!(labels(&registry), vec!["X", "Y", "Page 2"]);
    }

    #[test]
    fn test_long_sequence_ignores_extra() {
        let mut registry = registry(1);
        let changed = project_titles(&mut registry, &titles(&["X", "Y", "Z"]));

        assert_eq!(changed, vec![0]);
        assert_eq!(labels(&registry), vec!["X"]);
    }

    #[test]
    fn test_idempotent() {
        let mut once = registry(2);
        project_titles(&mut once, &titles(&["A", "B"]));

        let mut twice = registry(2);
        project_titles(&mut twice, &titles(&["A", "B"]));
        let second = project_titles(&mut twice, &titles(&["A", "B"]));

        assert!(second.is_empty());
        assert_eq!(labels(&once), labels(&twice));
    }
}
