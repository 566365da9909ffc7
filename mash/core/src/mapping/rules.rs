//! Per-category rule tables
//!
//! A rule fires when the lowercased condition value contains any of its
//! keywords. Rules in an `All` chain fire independently; a `FirstMatch`
//! chain stops at its first firing rule.

use super::ModificationKind::{self, *};
use crate::conditions::ConditionCategory;

pub(crate) struct ModSpec {
    pub kind: ModificationKind,
    pub target: &'static str,
    pub modification: &'static str,
    pub value: &'static str,
    pub reasoning: &'static str,
}

pub(crate) struct Rule {
    pub keywords: &'static [&'static str],
    pub mods: &'static [ModSpec],
}

pub(crate) enum Chain {
    All(&'static [Rule]),
    FirstMatch(&'static [Rule]),
}

impl Rule {
    fn fires(&self, value: &str) -> bool {
        self.keywords.iter().any(|k| value.contains(k))
    }
}

impl Chain {
    /// Specs fired by `value`, in table order
    pub(crate) fn fire(&self, value: &str) -> Vec<&'static ModSpec> {
        match self {
            Chain::All(rules) => rules
                .iter()
                .filter(|r| r.fires(value))
                .flat_map(|r| r.mods.iter())
                .collect(),
            Chain::FirstMatch(rules) => rules
                .iter()
                .find(|r| r.fires(value))
                .map(|r| r.mods.iter().collect())
                .unwrap_or_default(),
        }
    }
}

macro_rules! m {
    ($kind:expr, $target:expr, $modification:expr, $value:expr, $reasoning:expr) => {
        ModSpec {
            kind: $kind,
            target: $target,
            modification: $modification,
            value: $value,
            reasoning: $reasoning,
        }
    };
}

static ACCESSIBILITY: &[Chain] = &[Chain::All(&[
    Rule {
        keywords: &["screen_reader", "screen reader"],
        mods: &[
            m!(A11y, "all", "aria", "true", "Added ARIA attributes for screen reader support"),
            m!(A11y, "images", "alt-text", "required", "Ensure all images have alt text"),
            m!(A11y, "interactive", "keyboard-nav", "enhanced", "Enhanced keyboard navigation for interactive elements"),
        ],
    },
    Rule {
        keywords: &["color_blind", "color blind"],
        mods: &[
            m!(A11y, "colors", "contrast", "high", "Use high contrast color combinations"),
            m!(A11y, "status", "dual-indicators", "true", "Use both color and shape/text for status indicators"),
        ],
    },
    Rule {
        keywords: &["motor", "mobility"],
        mods: &[
            m!(A11y, "interactive", "target-size", "large", "Increase size of interactive elements"),
            m!(A11y, "spacing", "element-spacing", "increased", "Increase spacing between interactive elements"),
        ],
    },
    Rule {
        keywords: &["low_vision", "vision"],
        mods: &[
            m!(A11y, "text", "font-size", "larger", "Increase base font size"),
            m!(A11y, "text", "zoom-support", "true", "Ensure layout works with page zoom"),
        ],
    },
    Rule {
        keywords: &["high_contrast", "contrast"],
        mods: &[m!(A11y, "theme", "contrast", "high", "Use high contrast color theme")],
    },
    Rule {
        keywords: &["reduced_motion", "motion"],
        mods: &[m!(A11y, "animation", "reduced-motion", "true", "Minimize or eliminate animations")],
    },
])];

static DEVICE_TYPE: &[Chain] = &[Chain::All(&[
    Rule {
        keywords: &["mobile"],
        mods: &[
            m!(Layout, "structure", "layout-type", "mobile-first", "Use mobile-first layout design"),
            m!(Layout, "navigation", "nav-style", "mobile-optimized", "Use mobile-optimized navigation (hamburger menu)"),
            m!(Interaction, "touch", "touch-targets", "large", "Use larger touch targets for mobile"),
        ],
    },
    Rule {
        keywords: &["tablet"],
        mods: &[
            m!(Layout, "structure", "layout-type", "tablet-optimized", "Use tablet-optimized layout"),
            m!(Layout, "orientation", "support-orientation", "both", "Support both portrait and landscape orientations"),
        ],
    },
    Rule {
        keywords: &["desktop"],
        mods: &[
            m!(Layout, "structure", "layout-type", "desktop-optimized", "Use desktop-optimized layout with wider content area"),
            m!(Layout, "navigation", "nav-style", "horizontal", "Use horizontal navigation bar"),
        ],
    },
    Rule {
        keywords: &["tv"],
        mods: &[
            m!(Layout, "structure", "layout-type", "tv-optimized", "Use TV-optimized layout with large text and simplified navigation"),
            m!(Interaction, "navigation", "remote-friendly", "true", "Optimize for remote control navigation"),
        ],
    },
    Rule {
        keywords: &["wearable"],
        mods: &[
            m!(Layout, "structure", "layout-type", "minimal", "Use minimal layout optimized for tiny screens"),
            m!(Content, "text", "brevity", "extreme", "Use extremely concise text content"),
        ],
    },
])];

static USER_PREFERENCE: &[Chain] = &[Chain::All(&[
    Rule {
        keywords: &["dark_mode", "dark"],
        mods: &[m!(Theme, "colorScheme", "theme-mode", "dark", "Use dark color scheme")],
    },
    Rule {
        keywords: &["light_mode", "light"],
        mods: &[m!(Theme, "colorScheme", "theme-mode", "light", "Use light color scheme")],
    },
    Rule {
        keywords: &["reduced_animations", "animation"],
        mods: &[m!(Animation, "all", "animation-level", "minimal", "Minimize or eliminate animations")],
    },
    Rule {
        keywords: &["large_text", "large text"],
        mods: &[m!(Typography, "text", "font-size", "larger", "Use larger text sizes")],
    },
    Rule {
        keywords: &["minimalist", "minimal"],
        mods: &[
            m!(Design, "style", "visual-style", "minimalist", "Use minimalist visual style"),
            m!(Layout, "whitespace", "spacing", "generous", "Use generous whitespace"),
        ],
    },
    Rule {
        keywords: &["high_density", "dense"],
        mods: &[
            m!(Layout, "density", "content-density", "high", "Use high-density content layout"),
            m!(Layout, "whitespace", "spacing", "compact", "Use compact spacing"),
        ],
    },
])];

static BRANDING_STYLE: &[Chain] = &[Chain::FirstMatch(&[
    Rule {
        keywords: &["modern"],
        mods: &[m!(Branding, "style", "visual-style", "modern", "Use modern visual style with clean lines and minimal ornamentation")],
    },
    Rule {
        keywords: &["corporate"],
        mods: &[m!(Branding, "style", "visual-style", "corporate", "Use professional corporate style with conservative color scheme")],
    },
    Rule {
        keywords: &["playful"],
        mods: &[m!(Branding, "style", "visual-style", "playful", "Use playful style with vibrant colors and rounded shapes")],
    },
    Rule {
        keywords: &["luxury"],
        mods: &[m!(Branding, "style", "visual-style", "luxury", "Use luxury style with elegant typography and refined color palette")],
    },
    Rule {
        keywords: &["minimal"],
        mods: &[m!(Branding, "style", "visual-style", "minimal", "Use minimal style with abundant whitespace and limited color palette")],
    },
    Rule {
        keywords: &["technical"],
        mods: &[m!(Branding, "style", "visual-style", "technical", "Use technical style with data-focused presentation and structured layout")],
    },
    Rule {
        keywords: &["vintage"],
        mods: &[m!(Branding, "style", "visual-style", "vintage", "Use vintage style with retro typography and color schemes")],
    },
])];

static PERFORMANCE_NEEDS: &[Chain] = &[Chain::All(&[
    Rule {
        keywords: &["low_bandwidth", "bandwidth"],
        mods: &[
            m!(Performance, "images", "image-optimization", "aggressive", "Use aggressive image optimization and minimal images"),
            m!(Performance, "loading", "lazy-loading", "true", "Implement lazy loading for all non-critical content"),
        ],
    },
    Rule {
        keywords: &["low_spec", "low-spec"],
        mods: &[
            m!(Performance, "animation", "animation-level", "none", "Disable animations for better performance"),
            m!(Performance, "rendering", "simplified-rendering", "true", "Use simplified rendering for better performance"),
        ],
    },
    Rule {
        keywords: &["offline"],
        mods: &[
            m!(Performance, "connectivity", "offline-support", "true", "Implement offline support with service workers"),
            m!(Performance, "data", "local-storage", "enhanced", "Use enhanced local storage for offline data"),
        ],
    },
])];

static LEGACY_SUPPORT: &[Chain] = &[Chain::All(&[
    Rule {
        keywords: &["older_browsers", "older browser"],
        mods: &[
            m!(Compatibility, "features", "css-compatibility", "conservative", "Use more conservative CSS features"),
            m!(Compatibility, "js", "js-compatibility", "transpiled", "Ensure JavaScript is transpiled for older browsers"),
        ],
    },
    Rule {
        keywords: &["ie11", "internet explorer"],
        mods: &[
            m!(Compatibility, "browser", "ie11-support", "true", "Add specific IE11 support"),
            m!(Compatibility, "features", "css-grid-fallback", "true", "Provide fallbacks for modern CSS features"),
        ],
    },
    Rule {
        keywords: &["no_javascript", "no javascript"],
        mods: &[m!(Compatibility, "js", "no-js-fallback", "true", "Provide fallbacks for no-JavaScript environments")],
    },
    Rule {
        keywords: &["print_friendly", "print"],
        mods: &[m!(Media, "print", "print-styles", "true", "Add print-friendly styles")],
    },
])];

static CONTENT_DENSITY: &[Chain] = &[
    Chain::All(&[
        Rule {
            keywords: &["data_heavy", "data heavy"],
            mods: &[
                m!(Content, "data", "data-display", "tables", "Use tables and data visualization components"),
                m!(Layout, "density", "content-density", "high", "Use high-density layout for data presentation"),
            ],
        },
        Rule {
            keywords: &["text_heavy", "text heavy"],
            mods: &[
                m!(Typography, "text", "readability", "enhanced", "Optimize typography for reading long text"),
                m!(Layout, "width", "content-width", "readable", "Use optimal reading width for text content"),
            ],
        },
        Rule {
            keywords: &["media_rich", "media rich"],
            mods: &[
                m!(Media, "display", "media-layout", "gallery", "Use gallery-style layout for media presentation"),
                m!(Media, "loading", "lazy-loading", "true", "Implement lazy loading for media"),
            ],
        },
    ]),
    Chain::FirstMatch(&[
        Rule {
            keywords: &["spaced_out", "spacious"],
            mods: &[m!(Layout, "whitespace", "spacing", "generous", "Use generous whitespace throughout layout")],
        },
        Rule {
            keywords: &["compact"],
            mods: &[m!(Layout, "whitespace", "spacing", "compact", "Use compact spacing throughout layout")],
        },
    ]),
];

/// Rule chains for `category`, evaluated in order
pub(crate) fn chains_for(category: ConditionCategory) -> &'static [Chain] {
    match category {
        ConditionCategory::Accessibility => ACCESSIBILITY,
        ConditionCategory::DeviceType => DEVICE_TYPE,
        ConditionCategory::UserPreference => USER_PREFERENCE,
        ConditionCategory::BrandingStyle => BRANDING_STYLE,
        ConditionCategory::PerformanceNeeds => PERFORMANCE_NEEDS,
        ConditionCategory::LegacySupport => LEGACY_SUPPORT,
        ConditionCategory::ContentDensity => CONTENT_DENSITY,
    }
}
