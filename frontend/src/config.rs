
#[cfg(debug_assertions)]
pub fn get_backend_url() -> &'static str {
    "http://localhost:3001"  // Mail relay when running locally
}

#[cfg(not(debug_assertions))]
pub fn get_backend_url() -> &'static str {
    ""  // Same origin in production
}

pub fn mail_relay_url() -> String {
    format!("{}/api/send-email", get_backend_url())
}

/// Class names emitted by the static export. They are CSS-module hashes, so
/// every selector the bundle touches lives here.
pub mod selectors {
    pub const HEADER: &str = ".Header_header__z1DZP";
    pub const MENU_OPEN: &str = ".Header_menuOpen__u0_H5";
    pub const MOBILE_NAV: &str = ".Header_mobileNav__nlBu7";
    pub const MOBILE_NAV_OPEN_CLASS: &str = "Header_mobileNavOpen__Yp5YU";
    pub const MOBILE_NAV_CLOSE: &str = "img[src=\"/images/close.svg\"]";
    pub const SERVICES_LINK: &str = ".Header_linkMulti__uOmVn";
    pub const SERVICES_DROPDOWN: &str = ".Header_servicesNavWrapperOuter__eBYPR";

    pub const PROJECTS_ACCORDION: &str = ".Projects_accordion__SVvzD";
    pub const PROJECTS_PANEL: &str = ".Projects_accordionPanel__k2ce_";
    pub const PROJECTS_CONTENT: &str = ".Projects_accordionContent__vpAcZ";
    pub const PROJECTS_TRIGGER: &str = ".Projects_accordionTrigger__QvU3e";
    pub const PROJECTS_OVERLAY: &str = ".Projects_overlay__jgi58";
    pub const PROJECTS_OVERLAY_INACTIVE_CLASS: &str = "Projects_overlayInactive__E_x2P";
    pub const PROJECTS_CHIP: &str = ".Projects_accordionChip__2ET1P";
    pub const PROJECTS_NAV_ICON: &str = ".Projects_navigationIcon__Ww6uO";
    pub const PROJECTS_LINK: &str = "a";

    pub const HERO_TITLE: &str = ".Hero_heroTitle__IbUgH";
    pub const TYPED_CURSOR: &str = ".typed-cursor";

    pub const FEATURES_CONTAINER: &str = ".ServiceFeatures_container__EEVn8";
    pub const FEATURES_LINE_INNER: &str = ".ServiceFeatures_lineInner__SWYyr";
    pub const FEATURES_STEP: &str = ".ServiceFeatures_stepWrapper__YtNjT";
    pub const FEATURES_FEATURE: &str = ".ServiceFeatures_feature__7vlr_";
    pub const FEATURE_REVEAL_CONTAINER: &str =
        "div[style*=\"position: relative\"][style*=\"overflow: hidden\"]";
    pub const FEATURE_REVEAL_OVERLAY: &str =
        "div[style*=\"position: absolute\"][style*=\"z-index: 20\"][style*=\"background: rgb(59, 133, 183)\"]";
    pub const FEATURE_REVEAL_CONTENT: &str = "div[style*=\"opacity: 0\"][style*=\"translateY\"]";

    pub const REVEAL_GROUPS: &[&str] = &[
        ".ServiceFeatures_featureMain___wpBe > div > div",
        ".WhyCodefort_why__9A5In",
        ".Projects_projectsHeaderTexts__cgRT4 > div",
        ".Footer_copyrightWrapper__9VI0F > div > div",
        ".Footer_footerNavsWrapperInner__rU8OM > div > div",
    ];

    pub const CONTACT_FORM: &str = "#contact";
    pub const CONTACT_SUBMIT: &str = "button.Contaxct_formButton__buqaF";
    pub const CONTACT_MESSAGE: &str = "#messageId";
}

/// Addresses used when composing relay messages. The relay holds the
/// credential; the bundle only ever knows these public addresses.
pub mod contact {
    pub const SENDER_NAME: &str = "Contact Form";
    pub const SENDER_EMAIL: &str = "no-reply@codefort.dev";
    pub const RECIPIENT_NAME: &str = "Website Owner";
    pub const RECIPIENT_EMAIL: &str = "hello@codefort.dev";
    pub const SUBJECT: &str = "New Contact Form Submission";
    pub const MAILER: &str = "Website Contact Form";
}

/// Background artwork for the projects accordion, in panel order.
pub const PROJECT_BACKGROUNDS: &[&str] = &[
    "/_next/accordion/fintech.jpeg",
    "/_next/accordion/furniture.jpg",
    "/_next/accordion/nft.png",
];
