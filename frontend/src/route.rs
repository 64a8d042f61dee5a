use yew_router::prelude::*;

/// Pages of the static site that carry a typed hero headline.
#[derive(Clone, Routable, PartialEq, Debug)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/product-design")]
    ProductDesign,
    #[at("/blockchain")]
    Blockchain,
    #[at("/ai-and-ml")]
    AiAndMl,
    #[at("/software-development")]
    SoftwareDevelopment,
    #[at("/startup-solutions")]
    StartupSolutions,
    #[at("/maintainance")]
    Maintenance,
    #[at("/outsourcing")]
    Outsourcing,
    #[at("/our-process")]
    OurProcess,
    #[at("/about-us")]
    AboutUs,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl Route {
    pub fn current() -> Self {
        let path = web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string());
        Self::from_path(&path)
    }

    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Self::recognize(path).unwrap_or(Route::NotFound)
    }

    pub fn headlines(&self) -> &'static [&'static str] {
        match self {
            Route::Home => &[
                "Build your dream with us",
                "Transform your ideas into reality",
                "Scale your business efficiently",
                "Create exceptional experiences",
            ],
            Route::ProductDesign => &["Wow your users with the best product experience"],
            Route::Blockchain => &["Unleash the potential of Blockchain with our expertise"],
            Route::AiAndMl => &["Supercharge your business with intelligent and data-driven solutions"],
            Route::SoftwareDevelopment => &["Bring your ideas into reality with cutting-edge solutions"],
            Route::StartupSolutions => &["Build your dream with our budget-friendly solutions"],
            Route::Maintenance => &["Boost your business with seamless software performance"],
            Route::Outsourcing => &["Achieve Remarkable Success with a Strategic Partnership"],
            Route::OurProcess => &["Transforming Ideas into Digital Reality"],
            Route::AboutUs => &["We transform businesses with technology"],
            Route::NotFound => &[],
        }
    }
}
