use log::{debug, info};

use crate::components::{
    accessibility::Accessibility,
    carousel::CarouselConfig,
    contact::ContactForm,
    dropdown::ServicesDropdown,
    header::HeaderScroll,
    mobile_menu::MobileMenu,
    performance::LoadTiming,
    projects::ProjectsCarousel,
    reveal::{FeatureReveal, ScrollReveal},
    smooth_scroll::{self, SmoothScroll},
    stepper::ProgressStepper,
    typewriter::{TypedHeadline, TypewriterConfig},
};
use crate::config::selectors;
use crate::route::Route;

/// Every enhancement installed on the current page. Features whose markup is
/// missing are simply absent; dropping the site tears all of them down.
pub struct Site {
    route: Route,
    pub projects: Option<ProjectsCarousel>,
    pub mobile_menu: Option<MobileMenu>,
    pub dropdown: Option<ServicesDropdown>,
    pub headline: Option<TypedHeadline>,
    pub scroll_reveal: Option<ScrollReveal>,
    pub feature_reveal: Option<FeatureReveal>,
    pub stepper: Option<ProgressStepper>,
    pub header: Option<HeaderScroll>,
    pub contact: Option<ContactForm>,
    pub load_timing: Option<LoadTiming>,
    _smooth_scroll: SmoothScroll,
    _accessibility: Accessibility,
}

impl Site {
    pub fn install() -> Self {
        smooth_scroll::strip_export_query();
        let route = Route::current();
        debug!("installing site enhancements for {:?}", route);

        let site = Self {
            projects: ProjectsCarousel::install(CarouselConfig::default()),
            mobile_menu: MobileMenu::install(),
            dropdown: ServicesDropdown::install(),
            headline: TypedHeadline::install(&route, TypewriterConfig::default()),
            scroll_reveal: ScrollReveal::install(selectors::REVEAL_GROUPS),
            feature_reveal: FeatureReveal::install(),
            stepper: ProgressStepper::install(),
            header: HeaderScroll::install(),
            contact: ContactForm::install(),
            load_timing: LoadTiming::install(),
            _smooth_scroll: SmoothScroll::install(),
            _accessibility: Accessibility::install(),
            route,
        };
        info!("site ready ({} optional features active)", site.active_features());
        site
    }

    fn active_features(&self) -> usize {
        [
            self.projects.is_some(),
            self.mobile_menu.is_some(),
            self.dropdown.is_some(),
            self.headline.is_some(),
            self.scroll_reveal.is_some(),
            self.feature_reveal.is_some(),
            self.stepper.is_some(),
            self.header.is_some(),
            self.contact.is_some(),
            self.load_timing.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

impl Drop for Site {
    fn drop(&mut self) {
        debug!("tearing down site enhancements for {:?}", self.route);
    }
}
