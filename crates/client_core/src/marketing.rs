use std::collections::BTreeMap;

use shared::domain::{CartItemId, ItemCategory, Zar};

use crate::cart::CartStore;

/// Bundle price is this share of the individual package prices.
const BUNDLE_PERCENT: u64 = 70;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketingPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub price: Zar,
    pub duration: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub popular: bool,
}

pub static MARKETING_PACKAGES: [MarketingPackage; 6] = [
    MarketingPackage {
        id: "tiktok",
        name: "TikTok Campaigns",
        price: Zar::from_rands(2_000),
        duration: "30 days",
        description: "Engaging short-form video content tailored for viral potential",
        features: &["5 viral videos", "Hashtag strategy", "Trend analysis", "Performance analytics"],
        popular: true,
    },
    MarketingPackage {
        id: "facebook",
        name: "Facebook Marketing",
        price: Zar::from_rands(1_800),
        duration: "30 days",
        description: "Targeted ads and community building for maximum reach",
        features: &["Ad campaign management", "Audience targeting", "A/B testing", "ROI tracking"],
        popular: false,
    },
    MarketingPackage {
        id: "instagram",
        name: "Instagram Strategy",
        price: Zar::from_rands(1_700),
        duration: "30 days",
        description: "Visual storytelling and influencer collaborations",
        features: &["Content creation", "Influencer outreach", "Story campaigns", "Engagement analysis"],
        popular: false,
    },
    MarketingPackage {
        id: "linkedin",
        name: "LinkedIn Outreach",
        price: Zar::from_rands(2_400),
        duration: "30 days",
        description: "Professional network building and B2B marketing",
        features: &["Company page optimization", "Content marketing", "Lead generation", "Analytics"],
        popular: false,
    },
    MarketingPackage {
        id: "twitter",
        name: "Twitter Engagement",
        price: Zar::from_rands(1_500),
        duration: "30 days",
        description: "Real-time conversations and trend participation",
        features: &["Tweet strategy", "Hashtag campaigns", "Community management", "Trend analysis"],
        popular: false,
    },
    MarketingPackage {
        id: "email",
        name: "Email Campaigns",
        price: Zar::from_rands(1_000),
        duration: "30 days",
        description: "Personalized communication and lead nurturing",
        features: &["Email design", "Automation setup", "List management", "Performance tracking"],
        popular: false,
    },
];

pub const BUNDLE_NAME: &str = "Complete Marketing Suite";

pub fn find_package(id: &str) -> Option<&'static MarketingPackage> {
    MARKETING_PACKAGES
        .iter()
        .find(|package| package.id.eq_ignore_ascii_case(id))
}

impl MarketingPackage {
    pub fn cart_label(&self) -> String {
        format!("{} Marketing Package", self.name)
    }

    pub fn add_to_cart(&self, cart: &CartStore) -> CartItemId {
        cart.add_to_cart(
            self.cart_label(),
            self.price,
            ItemCategory::Marketing,
            Some(duration_metadata(self.duration)),
        )
    }
}

/// Sum of every package at list price.
pub fn bundle_list_price() -> Zar {
    MARKETING_PACKAGES.iter().map(|package| package.price).sum()
}

pub fn bundle_price() -> Zar {
    Zar::from_cents(bundle_list_price().cents() * BUNDLE_PERCENT / 100)
}

pub fn add_bundle_to_cart(cart: &CartStore) -> CartItemId {
    cart.add_to_cart(
        BUNDLE_NAME,
        bundle_price(),
        ItemCategory::Marketing,
        Some(duration_metadata("30 days")),
    )
}

fn duration_metadata(duration: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("duration".to_string(), duration.to_string())])
}
