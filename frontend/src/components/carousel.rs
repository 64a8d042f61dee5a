//! Panel carousel state machine (the projects accordion).
//!
//! Exactly one panel is active at a time. Every activation change repaints
//! all panels in a single pass and opens a transition window during which
//! further activation requests are dropped. The window is closed by the
//! owner calling [`Carousel::finish_transition`], normally from a timer.

use log::{debug, warn};

use crate::config::{self, selectors};
use crate::view::ViewNode;

const ACTIVE_CLASS: &str = "active";
const ACTIVE_FLEX: &str = "3";
const INACTIVE_FLEX: &str = "1";
const CHIP_ACTIVE_BG: &str = "rgb(59, 133, 183)";
const CHIP_ACTIVE_FG: &str = "white";
const CHIP_INACTIVE_BG: &str = "rgba(59, 133, 183, 0.1)";
const CHIP_INACTIVE_FG: &str = "rgb(59, 133, 183)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Stepping past either end is a no-op.
    Clamped,
    /// Stepping past either end wraps around.
    Cyclic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselConfig {
    /// Panel opened at construction. Clamped into range.
    pub initial_index: usize,
    pub mode: NavigationMode,
    pub transition_ms: u32,
    pub swipe_threshold: f64,
    /// Background image per panel, in panel order.
    pub backgrounds: &'static [&'static str],
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            initial_index: 1,
            mode: NavigationMode::Clamped,
            transition_ms: 400,
            swipe_threshold: 50.0,
            backgrounds: config::PROJECT_BACKGROUNDS,
        }
    }
}

/// Outcome of an activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    /// Target was already active or out of range.
    Unchanged,
    /// Dropped because a transition window is open.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Next,
    Previous,
    First,
    Last,
}

impl NavKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(Self::Next),
            "ArrowLeft" => Some(Self::Previous),
            "Home" => Some(Self::First),
            "End" => Some(Self::Last),
            _ => None,
        }
    }
}

/// Document-level key handling: nothing is captured while the user types
/// into a field or while the carousel is scrolled out of view.
pub fn nav_key_for(key: &str, editable_target: bool, in_view: bool) -> Option<NavKey> {
    if editable_target || !in_view {
        return None;
    }
    NavKey::from_key(key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Left,
    Right,
}

impl Swipe {
    /// Classifies a horizontal gesture. Leftward movement (start right of
    /// end) is `Left`.
    pub fn detect(start_x: f64, end_x: f64, threshold: f64) -> Option<Self> {
        let delta = start_x - end_x;
        if delta.abs() <= threshold {
            None
        } else if delta > 0.0 {
            Some(Self::Left)
        } else {
            Some(Self::Right)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Panel<N> {
    pub index: usize,
    pub root: N,
    pub content: Option<N>,
    pub trigger: Option<N>,
    pub link: Option<N>,
    overlay: Option<N>,
    chip: Option<N>,
}

impl<N: ViewNode> Panel<N> {
    pub fn from_node(index: usize, root: N) -> Self {
        Self {
            index,
            content: root.find(selectors::PROJECTS_CONTENT),
            trigger: root.find(selectors::PROJECTS_TRIGGER),
            link: root.find(selectors::PROJECTS_LINK),
            overlay: root.find(selectors::PROJECTS_OVERLAY),
            chip: root.find(selectors::PROJECTS_CHIP),
            root,
        }
    }

    fn set_background(&self, url: &str) {
        self.root.set_style("background-image", &format!("url({url})"));
        self.root.set_style("background-position", "center center");
        self.root.set_style("background-repeat", "no-repeat");
        self.root.set_style("background-size", "cover");
    }

    fn paint(&self, active: bool) {
        let flag = if active { "true" } else { "false" };
        if active {
            self.root.add_class(ACTIVE_CLASS);
        } else {
            self.root.remove_class(ACTIVE_CLASS);
        }
        self.root.set_attribute("aria-expanded", flag);
        self.root.set_style("flex", if active { ACTIVE_FLEX } else { INACTIVE_FLEX });

        if let Some(content) = &self.content {
            content.set_attribute("aria-hidden", if active { "false" } else { "true" });
            content.set_style("opacity", if active { "1" } else { "0" });
            content.set_style("transform", if active { "translateY(0)" } else { "translateY(20px)" });
        }
        if let Some(trigger) = &self.trigger {
            trigger.set_attribute("aria-expanded", flag);
        }
        if let Some(overlay) = &self.overlay {
            if active {
                overlay.remove_class(selectors::PROJECTS_OVERLAY_INACTIVE_CLASS);
            } else {
                overlay.add_class(selectors::PROJECTS_OVERLAY_INACTIVE_CLASS);
            }
            overlay.set_style("opacity", if active { "0.7" } else { "0.3" });
        }
        if let Some(chip) = &self.chip {
            chip.set_style("background-color", if active { CHIP_ACTIVE_BG } else { CHIP_INACTIVE_BG });
            chip.set_style("color", if active { CHIP_ACTIVE_FG } else { CHIP_INACTIVE_FG });
        }
    }
}

/// Previous/next indicators shown beside the carousel.
#[derive(Debug, Clone)]
pub struct NavArrows<N> {
    pub previous: N,
    pub next: N,
}

impl<N: ViewNode> NavArrows<N> {
    fn paint(&self, can_go_back: bool, can_go_forward: bool) {
        paint_arrow(&self.previous, can_go_back);
        paint_arrow(&self.next, can_go_forward);
    }
}

fn paint_arrow<N: ViewNode>(arrow: &N, enabled: bool) {
    arrow.set_style("opacity", if enabled { "1" } else { "0.5" });
    arrow.set_style("cursor", if enabled { "pointer" } else { "not-allowed" });
    arrow.set_attribute("aria-disabled", if enabled { "false" } else { "true" });
}

#[derive(Debug)]
pub struct Carousel<N> {
    panels: Vec<Panel<N>>,
    arrows: Option<NavArrows<N>>,
    active: usize,
    transitioning: bool,
    config: CarouselConfig,
}

impl<N: ViewNode> Carousel<N> {
    /// Builds a carousel over the panels found under `host`. Returns `None`
    /// when there are no panels.
    pub fn from_host(host: &N, arrows: Option<NavArrows<N>>, config: CarouselConfig) -> Option<Self> {
        let panels = host
            .find_all(selectors::PROJECTS_PANEL)
            .into_iter()
            .enumerate()
            .map(|(index, node)| Panel::from_node(index, node))
            .collect();
        Self::new(panels, arrows, config)
    }

    pub fn new(panels: Vec<Panel<N>>, arrows: Option<NavArrows<N>>, config: CarouselConfig) -> Option<Self> {
        if panels.is_empty() {
            debug!("carousel: no panels, nothing to do");
            return None;
        }
        let active = config.initial_index.min(panels.len() - 1);
        let carousel = Self { panels, arrows, active, transitioning: false, config };

        for (panel, url) in carousel.panels.iter().zip(carousel.config.backgrounds) {
            panel.set_background(url);
        }
        for panel in &carousel.panels {
            let id = format!("panel-{}", panel.index);
            panel.root.set_attribute("id", &id);
            if let Some(trigger) = &panel.trigger {
                trigger.set_attribute("role", "button");
                trigger.set_attribute("aria-controls", &id);
            }
        }
        carousel.paint();
        Some(carousel)
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_active(&self, index: usize) -> bool {
        index == self.active
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn panels(&self) -> &[Panel<N>] {
        &self.panels
    }

    pub fn activate(&mut self, target: usize) -> Transition {
        if target == self.active {
            return Transition::Unchanged;
        }
        if target >= self.panels.len() {
            warn!("carousel: ignoring out-of-range panel {}", target);
            return Transition::Unchanged;
        }
        if self.transitioning {
            debug!("carousel: dropping activation of {} during transition", target);
            return Transition::Busy;
        }
        self.active = target;
        self.transitioning = true;
        self.paint();
        Transition::Started
    }

    /// Target of the link inside panel `index`, only while that panel is
    /// the active one. Links in collapsed panels do not navigate.
    pub fn active_link(&self, index: usize) -> Option<String> {
        if index != self.active {
            return None;
        }
        self.panels.get(index)?.link.as_ref()?.attribute("href")
    }

    pub fn finish_transition(&mut self) {
        self.transitioning = false;
    }

    pub fn next(&mut self) -> Transition {
        let last = self.panels.len() - 1;
        let target = match self.config.mode {
            NavigationMode::Clamped if self.active == last => return Transition::Unchanged,
            NavigationMode::Clamped => self.active + 1,
            NavigationMode::Cyclic => (self.active + 1) % self.panels.len(),
        };
        self.activate(target)
    }

    pub fn previous(&mut self) -> Transition {
        let target = match self.config.mode {
            NavigationMode::Clamped if self.active == 0 => return Transition::Unchanged,
            NavigationMode::Clamped => self.active - 1,
            NavigationMode::Cyclic => (self.active + self.panels.len() - 1) % self.panels.len(),
        };
        self.activate(target)
    }

    pub fn activate_by_pointer(&mut self, node: &N) -> Transition {
        match self.panels.iter().position(|p| &p.root == node) {
            Some(index) => self.activate(index),
            None => Transition::Unchanged,
        }
    }

    pub fn handle_key(&mut self, key: NavKey) -> Transition {
        match key {
            NavKey::Next => self.next(),
            NavKey::Previous => self.previous(),
            NavKey::First => self.activate(0),
            NavKey::Last => self.activate(self.panels.len() - 1),
        }
    }

    pub fn handle_swipe(&mut self, start_x: f64, end_x: f64) -> Transition {
        match Swipe::detect(start_x, end_x, self.config.swipe_threshold) {
            Some(Swipe::Left) => self.next(),
            Some(Swipe::Right) => self.previous(),
            None => Transition::Unchanged,
        }
    }

    fn paint(&self) {
        for panel in &self.panels {
            panel.paint(panel.index == self.active);
        }
        if let Some(arrows) = &self.arrows {
            match self.config.mode {
                NavigationMode::Clamped => {
                    arrows.paint(self.active > 0, self.active + 1 < self.panels.len())
                }
                NavigationMode::Cyclic => arrows.paint(true, true),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::testing::MockNode;
    use pretty_assertions::assert_eq;

    fn panel_class(selector: &str) -> &str {
        selector.trim_start_matches('.')
    }

    fn host_with_panels(count: usize) -> MockNode {
        let host = MockNode::with_class(panel_class(selectors::PROJECTS_ACCORDION));
        for i in 0..count {
            let panel = host.append(MockNode::with_class(panel_class(selectors::PROJECTS_PANEL)));
            panel.append(MockNode::with_class(panel_class(selectors::PROJECTS_CONTENT)));
            panel.append(MockNode::with_class(panel_class(selectors::PROJECTS_TRIGGER)));
            panel.append(MockNode::with_class(panel_class(selectors::PROJECTS_OVERLAY)));
            let link = panel.append(MockNode::with_tag("a"));
            link.set_attribute("href", &format!("https://example.com/case-{i}"));
        }
        host
    }

    fn build(count: usize, config: CarouselConfig) -> (MockNode, Carousel<MockNode>) {
        let host = host_with_panels(count);
        let carousel = Carousel::from_host(&host, None, config).expect("panels present");
        (host, carousel)
    }

    fn clamped_from(initial_index: usize) -> CarouselConfig {
        CarouselConfig { initial_index, ..CarouselConfig::default() }
    }

    fn cyclic_from(initial_index: usize) -> CarouselConfig {
        CarouselConfig { initial_index, mode: NavigationMode::Cyclic, ..CarouselConfig::default() }
    }

    fn exposed_active(carousel: &Carousel<MockNode>) -> Vec<usize> {
        carousel
            .panels()
            .iter()
            .filter(|p| p.root.attr("aria-expanded").as_deref() == Some("true"))
            .map(|p| p.index)
            .collect()
    }

    /// Steps with the transition window closed in between, as the timer would.
    fn settle(carousel: &mut Carousel<MockNode>, op: impl FnOnce(&mut Carousel<MockNode>) -> Transition) {
        op(carousel);
        carousel.finish_transition();
    }

    #[test]
    fn empty_host_builds_nothing() {
        let host = MockNode::default();
        assert!(Carousel::from_host(&host, None, CarouselConfig::default()).is_none());
    }

    #[test]
    fn construction_opens_configured_panel_and_wires_aria() {
        let (_, carousel) = build(3, CarouselConfig::default());
        assert_eq!(carousel.active_index(), 1);
        assert!(!carousel.is_transitioning());
        assert_eq!(exposed_active(&carousel), vec![1]);

        let second = &carousel.panels()[1];
        assert_eq!(second.root.attr("id").as_deref(), Some("panel-1"));
        let trigger = second.trigger.as_ref().unwrap();
        assert_eq!(trigger.attr("role").as_deref(), Some("button"));
        assert_eq!(trigger.attr("aria-controls").as_deref(), Some("panel-1"));
        assert_eq!(second.root.style("flex").as_deref(), Some("3"));
        assert_eq!(carousel.panels()[0].root.style("flex").as_deref(), Some("1"));
        assert_eq!(
            carousel.panels()[0].content.as_ref().unwrap().attr("aria-hidden").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn initial_index_is_clamped_into_range() {
        let (_, carousel) = build(2, clamped_from(7));
        assert_eq!(carousel.active_index(), 1);
    }

    #[test]
    fn at_most_one_panel_is_exposed_active_after_every_step() {
        let (_, mut carousel) = build(4, cyclic_from(0));
        let ops: Vec<fn(&mut Carousel<MockNode>) -> Transition> = vec![
            |c| c.next(),
            |c| c.next(),
            |c| c.previous(),
            |c| c.activate(3),
            |c| c.next(),
            |c| c.handle_key(NavKey::Last),
            |c| c.handle_key(NavKey::First),
            |c| c.previous(),
        ];
        for op in ops {
            settle(&mut carousel, op);
            assert_eq!(exposed_active(&carousel), vec![carousel.active_index()]);
            assert!(carousel.active_index() < carousel.len());
        }
    }

    #[test]
    fn cyclic_navigation_returns_to_start_after_a_full_lap() {
        let (_, mut carousel) = build(3, cyclic_from(1));
        for _ in 0..3 {
            settle(&mut carousel, |c| c.next());
        }
        assert_eq!(carousel.active_index(), 1);
        for _ in 0..3 {
            settle(&mut carousel, |c| c.previous());
        }
        assert_eq!(carousel.active_index(), 1);
    }

    #[test]
    fn cyclic_wraps_at_both_ends() {
        let (_, mut carousel) = build(3, cyclic_from(2));
        settle(&mut carousel, |c| c.next());
        assert_eq!(carousel.active_index(), 0);
        settle(&mut carousel, |c| c.previous());
        assert_eq!(carousel.active_index(), 2);
    }

    #[test]
    fn second_activation_inside_transition_window_is_dropped() {
        let (_, mut carousel) = build(3, clamped_from(1));
        assert_eq!(carousel.activate(0), Transition::Started);
        assert_eq!(carousel.activate(2), Transition::Busy);
        assert_eq!(carousel.active_index(), 0);
        assert_eq!(exposed_active(&carousel), vec![0]);

        carousel.finish_transition();
        assert_eq!(carousel.activate(2), Transition::Started);
        assert_eq!(carousel.active_index(), 2);
    }

    #[test]
    fn activating_the_active_panel_does_nothing() {
        let (host, mut carousel) = build(3, clamped_from(1));
        let before: Vec<usize> = host.find_all(selectors::PROJECTS_PANEL).iter().map(|p| p.mutations()).collect();

        assert_eq!(carousel.activate(1), Transition::Unchanged);
        assert!(!carousel.is_transitioning());
        let after: Vec<usize> = host.find_all(selectors::PROJECTS_PANEL).iter().map(|p| p.mutations()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn clamped_mode_stops_at_edges() {
        let (_, mut carousel) = build(3, clamped_from(0));
        assert_eq!(carousel.previous(), Transition::Unchanged);
        assert_eq!(carousel.active_index(), 0);

        let (_, mut carousel) = build(3, clamped_from(2));
        assert_eq!(carousel.next(), Transition::Unchanged);
        assert_eq!(carousel.active_index(), 2);
    }

    #[test]
    fn out_of_range_activation_is_ignored() {
        let (_, mut carousel) = build(3, clamped_from(0));
        assert_eq!(carousel.activate(3), Transition::Unchanged);
        assert_eq!(carousel.active_index(), 0);
        assert!(!carousel.is_transitioning());
    }

    #[test]
    fn swipe_maps_to_single_step() {
        let (_, mut carousel) = build(3, clamped_from(1));
        assert_eq!(carousel.handle_swipe(300.0, 200.0), Transition::Started);
        assert_eq!(carousel.active_index(), 2);
        carousel.finish_transition();

        assert_eq!(carousel.handle_swipe(200.0, 260.0), Transition::Started);
        assert_eq!(carousel.active_index(), 1);
        carousel.finish_transition();

        assert_eq!(carousel.handle_swipe(200.0, 220.0), Transition::Unchanged);
        assert_eq!(carousel.active_index(), 1);
    }

    #[test]
    fn swipe_threshold_is_exclusive() {
        assert_eq!(Swipe::detect(250.0, 200.0, 50.0), None);
        assert_eq!(Swipe::detect(250.5, 200.0, 50.0), Some(Swipe::Left));
        assert_eq!(Swipe::detect(100.0, 151.0, 50.0), Some(Swipe::Right));
    }

    #[test]
    fn home_and_end_jump_to_edges() {
        let (_, mut carousel) = build(5, clamped_from(2));
        settle(&mut carousel, |c| c.handle_key(NavKey::Last));
        assert_eq!(carousel.active_index(), 4);
        settle(&mut carousel, |c| c.handle_key(NavKey::First));
        assert_eq!(carousel.active_index(), 0);
    }

    #[test]
    fn key_names_map_to_navigation() {
        assert_eq!(NavKey::from_key("ArrowRight"), Some(NavKey::Next));
        assert_eq!(NavKey::from_key("ArrowLeft"), Some(NavKey::Previous));
        assert_eq!(NavKey::from_key("Home"), Some(NavKey::First));
        assert_eq!(NavKey::from_key("End"), Some(NavKey::Last));
        assert_eq!(NavKey::from_key("ArrowUp"), None);
    }

    #[test]
    fn pointer_activation_resolves_the_panel_node() {
        let (host, mut carousel) = build(3, clamped_from(1));
        let third = host.find_all(selectors::PROJECTS_PANEL)[2].clone();
        assert_eq!(carousel.activate_by_pointer(&third), Transition::Started);
        assert_eq!(carousel.active_index(), 2);

        carousel.finish_transition();
        let stranger = MockNode::default();
        assert_eq!(carousel.activate_by_pointer(&stranger), Transition::Unchanged);
    }

    #[test]
    fn arrows_dim_at_edges_only_in_clamped_mode() {
        let host = host_with_panels(3);
        let arrows = NavArrows { previous: MockNode::default(), next: MockNode::default() };
        let mut carousel = Carousel::from_host(&host, Some(arrows.clone()), clamped_from(0)).unwrap();
        assert_eq!(arrows.previous.style("cursor").as_deref(), Some("not-allowed"));
        assert_eq!(arrows.previous.attr("aria-disabled").as_deref(), Some("true"));
        assert_eq!(arrows.next.style("opacity").as_deref(), Some("1"));

        settle(&mut carousel, |c| c.handle_key(NavKey::Last));
        assert_eq!(arrows.previous.style("opacity").as_deref(), Some("1"));
        assert_eq!(arrows.next.style("opacity").as_deref(), Some("0.5"));

        let arrows = NavArrows { previous: MockNode::default(), next: MockNode::default() };
        Carousel::from_host(&host, Some(arrows.clone()), cyclic_from(0)).unwrap();
        assert_eq!(arrows.previous.style("cursor").as_deref(), Some("pointer"));
        assert_eq!(arrows.next.style("cursor").as_deref(), Some("pointer"));
    }

    #[test]
    fn overlay_class_follows_active_panel() {
        let (_, mut carousel) = build(2, clamped_from(0));
        let overlay = |c: &Carousel<MockNode>, i: usize| c.panels()[i].root.find(selectors::PROJECTS_OVERLAY).unwrap();
        assert!(!overlay(&carousel, 0).has_class(selectors::PROJECTS_OVERLAY_INACTIVE_CLASS));
        assert!(overlay(&carousel, 1).has_class(selectors::PROJECTS_OVERLAY_INACTIVE_CLASS));

        carousel.next();
        assert!(overlay(&carousel, 0).has_class(selectors::PROJECTS_OVERLAY_INACTIVE_CLASS));
        assert!(!overlay(&carousel, 1).has_class(selectors::PROJECTS_OVERLAY_INACTIVE_CLASS));
        assert!(carousel.panels()[1].root.has_class("active"));
        assert!(!carousel.panels()[0].root.has_class("active"));
    }

    #[test]
    fn panels_get_their_background_artwork() {
        let (_, carousel) = build(4, CarouselConfig::default());
        let first = &carousel.panels()[0].root;
        assert_eq!(first.style("background-image").as_deref(), Some("url(/_next/accordion/fintech.jpeg)"));
        assert_eq!(first.style("background-size").as_deref(), Some("cover"));
        assert_eq!(
            carousel.panels()[2].root.style("background-image").as_deref(),
            Some("url(/_next/accordion/nft.png)")
        );
        assert_eq!(carousel.panels()[3].root.style("background-image"), None);
    }

    #[test]
    fn only_the_active_panel_link_navigates() {
        let (_, mut carousel) = build(3, clamped_from(1));
        assert_eq!(carousel.active_link(1).as_deref(), Some("https://example.com/case-1"));
        assert_eq!(carousel.active_link(0), None);
        assert_eq!(carousel.active_link(9), None);

        settle(&mut carousel, |c| c.activate(0));
        assert_eq!(carousel.active_link(0).as_deref(), Some("https://example.com/case-0"));
        assert_eq!(carousel.active_link(1), None);
    }

    #[test]
    fn document_keys_respect_focus_and_visibility() {
        assert_eq!(nav_key_for("ArrowRight", false, true), Some(NavKey::Next));
        assert_eq!(nav_key_for("End", false, true), Some(NavKey::Last));
        assert_eq!(nav_key_for("ArrowRight", true, true), None);
        assert_eq!(nav_key_for("ArrowLeft", false, false), None);
        assert_eq!(nav_key_for("a", false, true), None);
    }
}
