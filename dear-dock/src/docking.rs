//! Docking layout description and application.
//!
//! A layout is described by data: a list of [`DockingSplit`]s that carve named
//! spaces out of the main dockspace, and a list of [`DockableWindow`]s that each
//! name the space they start in. [`DockingParams::plan`] checks the description
//! and resolves it into a [`LayoutPlan`]; [`apply_layout`] replays the plan
//! through Dear ImGui's `DockBuilder`.
//!
//! ```text
//!  ___________________________________________
//!  |        |                                |
//!  | Left   |                                |
//!  | Space  |    MainDockSpace               |
//!  |        |                                |
//!  -------------------------------------------
//!  |     BottomSpace                         |
//!  -------------------------------------------
//! ```
use std::collections::{HashMap, HashSet};

use dear_imgui_rs::{DockBuilder, DockNodeFlags, Id, SplitDirection};
use thiserror::Error;
use tracing::debug;

use crate::GuiFn;

/// Name of the dockspace the runner creates over the main viewport.
pub const MAIN_DOCK_SPACE: &str = "MainDockSpace";

/// A named space split out of an existing one.
#[derive(Clone, Debug, PartialEq)]
pub struct DockingSplit {
    /// Space being split. It keeps the remainder after the split.
    pub initial_dock: String,
    /// Name given to the newly created space.
    pub new_dock: String,
    pub direction: SplitDirection,
    /// Fraction of `initial_dock` given to `new_dock`, in (0, 1).
    pub ratio: f32,
}

impl DockingSplit {
    pub fn new(
        initial_dock: impl Into<String>,
        new_dock: impl Into<String>,
        direction: SplitDirection,
        ratio: f32,
    ) -> Self {
        Self {
            initial_dock: initial_dock.into(),
            new_dock: new_dock.into(),
            direction,
            ratio,
        }
    }
}

/// A window placed in a docking space, with its per-frame GUI.
pub struct DockableWindow<S> {
    pub label: String,
    pub dock_space_name: String,
    pub gui: GuiFn<S>,
    pub is_visible: bool,
    /// List the window under View so it can be shown/hidden.
    pub include_in_view_menu: bool,
}

impl<S> DockableWindow<S> {
    pub fn new<F>(label: impl Into<String>, dock_space_name: impl Into<String>, gui: F) -> Self
    where
        F: FnMut(&mut crate::GuiCtx<'_>, &mut S) + 'static,
    {
        Self {
            label: label.into(),
            dock_space_name: dock_space_name.into(),
            gui: Box::new(gui),
            is_visible: true,
            include_in_view_menu: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }
}

/// When the default layout is written into the dockspace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutCondition {
    /// Only when the dockspace has no saved layout (no node in the ini file).
    #[default]
    FirstUseEver,
    /// On every application start, discarding the saved layout.
    ApplicationStart,
}

pub struct DockingParams<S> {
    pub docking_splits: Vec<DockingSplit>,
    pub dockable_windows: Vec<DockableWindow<S>>,
    pub main_dock_space_name: String,
    pub layout_condition: LayoutCondition,
}

impl<S> Default for DockingParams<S> {
    fn default() -> Self {
        Self {
            docking_splits: Vec::new(),
            dockable_windows: Vec::new(),
            main_dock_space_name: MAIN_DOCK_SPACE.to_string(),
            layout_condition: LayoutCondition::default(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("docking split #{index} has an empty dock name")]
    EmptySplitName { index: usize },
    #[error("docking split {new_dock:?} has ratio {ratio}, expected a value in (0, 1)")]
    InvalidRatio { new_dock: String, ratio: f32 },
    #[error("docking split {new_dock:?} splits unknown space {initial_dock:?}")]
    UnknownInitialDock {
        new_dock: String,
        initial_dock: String,
    },
    #[error("docking space {0:?} is defined more than once")]
    DuplicateSpace(String),
    #[error("dockable window #{index} has an empty label")]
    EmptyWindowLabel { index: usize },
    #[error("dockable window {0:?} is defined more than once")]
    DuplicateWindow(String),
    #[error("dockable window {window:?} targets unknown space {space:?}")]
    UnknownDockSpace { window: String, space: String },
}

/// A split step of a resolved layout.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedSplit {
    pub parent: String,
    pub new_dock: String,
    pub direction: SplitDirection,
    pub ratio: f32,
}

/// A checked layout, ready to be replayed into a dockspace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutPlan {
    pub root: String,
    pub splits: Vec<PlannedSplit>,
    /// `(window label, space name)` in declaration order.
    pub placements: Vec<(String, String)>,
}

impl LayoutPlan {
    /// Names of every space of the layout, root first.
    pub fn spaces(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.root.as_str()).chain(self.splits.iter().map(|s| s.new_dock.as_str()))
    }
}

impl<S> DockingParams<S> {
    /// Check splits and windows and resolve them into a [`LayoutPlan`].
    ///
    /// Splits are applied in order, so a split may only refer to the main
    /// dockspace or to a space created by an earlier split.
    pub fn plan(&self) -> Result<LayoutPlan, LayoutError> {
        let root = self.main_dock_space_name.clone();
        let mut known: HashSet<&str> = HashSet::new();
        known.insert(root.as_str());

        let mut splits = Vec::with_capacity(self.docking_splits.len());
        for (index, split) in self.docking_splits.iter().enumerate() {
            if split.initial_dock.is_empty() || split.new_dock.is_empty() {
                return Err(LayoutError::EmptySplitName { index });
            }
            if !(split.ratio > 0.0 && split.ratio < 1.0) {
                return Err(LayoutError::InvalidRatio {
                    new_dock: split.new_dock.clone(),
                    ratio: split.ratio,
                });
            }
            if !known.contains(split.initial_dock.as_str()) {
                return Err(LayoutError::UnknownInitialDock {
                    new_dock: split.new_dock.clone(),
                    initial_dock: split.initial_dock.clone(),
                });
            }
            if !known.insert(split.new_dock.as_str()) {
                return Err(LayoutError::DuplicateSpace(split.new_dock.clone()));
            }
            splits.push(PlannedSplit {
                parent: split.initial_dock.clone(),
                new_dock: split.new_dock.clone(),
                direction: split.direction,
                ratio: split.ratio,
            });
        }

        let mut labels: HashSet<&str> = HashSet::new();
        let mut placements = Vec::with_capacity(self.dockable_windows.len());
        for (index, window) in self.dockable_windows.iter().enumerate() {
            if window.label.is_empty() {
                return Err(LayoutError::EmptyWindowLabel { index });
            }
            if !labels.insert(window.label.as_str()) {
                return Err(LayoutError::DuplicateWindow(window.label.clone()));
            }
            if !known.contains(window.dock_space_name.as_str()) {
                return Err(LayoutError::UnknownDockSpace {
                    window: window.label.clone(),
                    space: window.dock_space_name.clone(),
                });
            }
            placements.push((window.label.clone(), window.dock_space_name.clone()));
        }

        Ok(LayoutPlan {
            root,
            splits,
            placements,
        })
    }
}

/// Rebuild `dockspace_id` from `plan`.
///
/// Must be called inside a frame, before the dockspace is submitted.
pub(crate) fn apply_layout(plan: &LayoutPlan, dockspace_id: Id, pos: [f32; 2], size: [f32; 2]) {
    DockBuilder::remove_node_docked_windows(dockspace_id, true);
    DockBuilder::remove_node(dockspace_id);
    DockBuilder::add_node(dockspace_id, DockNodeFlags::NONE);
    DockBuilder::set_node_pos(dockspace_id, pos);
    DockBuilder::set_node_size(dockspace_id, size);

    let mut nodes: HashMap<&str, Id> = HashMap::new();
    nodes.insert(plan.root.as_str(), dockspace_id);
    for split in &plan.splits {
        // plan() guarantees the parent exists
        let Some(&parent) = nodes.get(split.parent.as_str()) else {
            continue;
        };
        let (new_node, remaining) = DockBuilder::split_node(parent, split.direction, split.ratio);
        nodes.insert(split.parent.as_str(), remaining);
        nodes.insert(split.new_dock.as_str(), new_node);
    }

    for (label, space) in &plan.placements {
        if let Some(&node) = nodes.get(space.as_str()) {
            DockBuilder::dock_window(label, node);
        }
    }
    DockBuilder::finish(dockspace_id);
    debug!(
        splits = plan.splits.len(),
        windows = plan.placements.len(),
        "Applied docking layout"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(splits: Vec<DockingSplit>, windows: &[(&str, &str)]) -> DockingParams<()> {
        DockingParams {
            docking_splits: splits,
            dockable_windows: windows
                .iter()
                .map(|(label, space)| DockableWindow::new(*label, *space, |_, _| {}))
                .collect(),
            ..Default::default()
        }
    }

    fn demo_splits() -> Vec<DockingSplit> {
        vec![
            DockingSplit::new(MAIN_DOCK_SPACE, "BottomSpace", SplitDirection::Down, 0.25),
            DockingSplit::new(MAIN_DOCK_SPACE, "LeftSpace", SplitDirection::Left, 0.25),
        ]
    }

    #[test]
    fn plan_resolves_splits_and_placements_in_order() {
        let p = params(
            demo_splits(),
            &[
                ("Commands", "LeftSpace"),
                ("Logs", "BottomSpace"),
                ("Dear ImGui Demo", MAIN_DOCK_SPACE),
            ],
        );
        let plan = p.plan().unwrap();
        assert_eq!(plan.root, MAIN_DOCK_SPACE);
        assert_eq!(
            plan.spaces().collect::<Vec<_>>(),
            vec![MAIN_DOCK_SPACE, "BottomSpace", "LeftSpace"]
        );
        assert_eq!(plan.splits[0].parent, MAIN_DOCK_SPACE);
        assert_eq!(plan.splits[1].direction, SplitDirection::Left);
        assert_eq!(
            plan.placements,
            vec![
                ("Commands".to_string(), "LeftSpace".to_string()),
                ("Logs".to_string(), "BottomSpace".to_string()),
                ("Dear ImGui Demo".to_string(), MAIN_DOCK_SPACE.to_string()),
            ]
        );
    }

    #[test]
    fn split_may_refer_to_an_earlier_split() {
        let mut splits = demo_splits();
        splits.push(DockingSplit::new("LeftSpace", "LeftBottom", SplitDirection::Down, 0.5));
        assert!(params(splits, &[("Tools", "LeftBottom")]).plan().is_ok());
    }

    #[test]
    fn split_referring_to_a_later_split_is_rejected() {
        let splits = vec![
            DockingSplit::new("LeftSpace", "LeftBottom", SplitDirection::Down, 0.5),
            DockingSplit::new(MAIN_DOCK_SPACE, "LeftSpace", SplitDirection::Left, 0.25),
        ];
        assert_eq!(
            params(splits, &[]).plan(),
            Err(LayoutError::UnknownInitialDock {
                new_dock: "LeftBottom".into(),
                initial_dock: "LeftSpace".into(),
            })
        );
    }

    #[test]
    fn ratios_outside_the_open_unit_interval_are_rejected() {
        for ratio in [0.0, 1.0, -0.1, 1.5, f32::NAN] {
            let splits = vec![DockingSplit::new(
                MAIN_DOCK_SPACE,
                "Side",
                SplitDirection::Right,
                ratio,
            )];
            assert!(
                matches!(
                    params(splits, &[]).plan(),
                    Err(LayoutError::InvalidRatio { .. })
                ),
                "ratio {ratio} accepted"
            );
        }
    }

    #[test]
    fn empty_names_are_rejected() {
        let splits = vec![DockingSplit::new(MAIN_DOCK_SPACE, "", SplitDirection::Up, 0.3)];
        assert_eq!(
            params(splits, &[]).plan(),
            Err(LayoutError::EmptySplitName { index: 0 })
        );
        assert_eq!(
            params(vec![], &[("", MAIN_DOCK_SPACE)]).plan(),
            Err(LayoutError::EmptyWindowLabel { index: 0 })
        );
    }

    #[test]
    fn duplicate_spaces_and_windows_are_rejected() {
        let mut splits = demo_splits();
        splits.push(DockingSplit::new(MAIN_DOCK_SPACE, "LeftSpace", SplitDirection::Left, 0.1));
        assert_eq!(
            params(splits, &[]).plan(),
            Err(LayoutError::DuplicateSpace("LeftSpace".into()))
        );

        let splits = vec![DockingSplit::new(
            MAIN_DOCK_SPACE,
            MAIN_DOCK_SPACE,
            SplitDirection::Left,
            0.1,
        )];
        assert_eq!(
            params(splits, &[]).plan(),
            Err(LayoutError::DuplicateSpace(MAIN_DOCK_SPACE.into()))
        );

        assert_eq!(
            params(demo_splits(), &[("Logs", "BottomSpace"), ("Logs", "LeftSpace")]).plan(),
            Err(LayoutError::DuplicateWindow("Logs".into()))
        );
    }

    #[test]
    fn window_in_unknown_space_is_rejected() {
        assert_eq!(
            params(demo_splits(), &[("Logs", "RightSpace")]).plan(),
            Err(LayoutError::UnknownDockSpace {
                window: "Logs".into(),
                space: "RightSpace".into(),
            })
        );
    }

    #[test]
    fn custom_main_dock_space_name_is_the_root() {
        let mut p = params(
            vec![DockingSplit::new("Root", "Side", SplitDirection::Right, 0.3)],
            &[("Main", "Root")],
        );
        p.main_dock_space_name = "Root".into();
        let plan = p.plan().unwrap();
        assert_eq!(plan.root, "Root");
        assert_eq!(plan.placements[0].1, "Root");
    }
}
