//! Demo merchant, offer, and media-type directory.
//!
//! Stands in for the platform catalog service. Lookup is by substring over
//! lowercased input, first match in directory order.

/// A merchant the campaign handler can build ads for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Merchant {
    pub id: &'static str,
    /// Registered legal name.
    pub name: &'static str,
    /// "Doing business as" display name, what users actually type.
    pub dba: &'static str,
}

/// A promotable offer belonging to one merchant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Offer {
    pub id: &'static str,
    pub merchant_id: &'static str,
    pub name: &'static str,
    pub short_text: &'static str,
}

/// An ad format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaType {
    pub id: &'static str,
    pub label: &'static str,
    pub dimensions: &'static str,
    /// Whether a creative asset must be uploaded before launch.
    pub requires_asset: bool,
}

pub const MERCHANTS: &[Merchant] = &[
    Merchant { id: "m1", name: "Starbucks Coffee", dba: "Starbucks" },
    Merchant { id: "m2", name: "McDonald's Corporation", dba: "McDonald's" },
    Merchant { id: "m3", name: "Target Corporation", dba: "Target" },
    Merchant { id: "m4", name: "Best Buy Co., Inc.", dba: "Best Buy" },
    Merchant { id: "m5", name: "Nike, Inc.", dba: "Nike" },
];

pub const OFFERS: &[Offer] = &[
    Offer {
        id: "mcm_o1_2023",
        merchant_id: "m1",
        name: "Buy one get one free coffee",
        short_text: "BOGO Coffee",
    },
    Offer {
        id: "mcm_o2_2023",
        merchant_id: "m1",
        name: "$5 off orders $20+",
        short_text: "$5 off $20+",
    },
    Offer {
        id: "mcm_o3_2023",
        merchant_id: "m2",
        name: "Free fries with any burger",
        short_text: "Free Fries",
    },
    Offer {
        id: "mcm_o4_2023",
        merchant_id: "m2",
        name: "20% off Happy Meals",
        short_text: "20% off Happy Meals",
    },
    Offer {
        id: "mcm_o5_2023",
        merchant_id: "m3",
        name: "15% off clothing",
        short_text: "15% off Clothing",
    },
    Offer {
        id: "mcm_o6_2023",
        merchant_id: "m3",
        name: "Free shipping on $35+",
        short_text: "Free Shipping",
    },
    Offer {
        id: "mcm_o7_2023",
        merchant_id: "m4",
        name: "$100 off laptops",
        short_text: "$100 off Laptops",
    },
    Offer {
        id: "mcm_o8_2023",
        merchant_id: "m4",
        name: "Extended warranty included",
        short_text: "Extended Warranty",
    },
    Offer {
        id: "mcm_o9_2023",
        merchant_id: "m5",
        name: "Buy 2 get 1 free shoes",
        short_text: "B2G1 Shoes",
    },
    Offer {
        id: "mcm_o10_2023",
        merchant_id: "m5",
        name: "Free Nike+ membership",
        short_text: "Free Nike+",
    },
];

pub const MEDIA_TYPES: &[MediaType] = &[
    MediaType {
        id: "display_banner",
        label: "Display Banner",
        dimensions: "728x90",
        requires_asset: true,
    },
    MediaType {
        id: "double_decker",
        label: "Double Decker",
        dimensions: "728x180",
        requires_asset: true,
    },
    MediaType {
        id: "native",
        label: "Native (Text Only)",
        dimensions: "Text Only",
        requires_asset: false,
    },
];

/// First merchant whose legal or display name appears in the input.
pub fn find_merchant_mention(input: &str) -> Option<&'static Merchant> {
    let lowered = input.to_lowercase();
    MERCHANTS.iter().find(|m| {
        lowered.contains(&m.name.to_lowercase()) || lowered.contains(&m.dba.to_lowercase())
    })
}

pub fn merchant_by_id(id: &str) -> Option<&'static Merchant> {
    MERCHANTS.iter().find(|m| m.id == id)
}

/// All offers belonging to a merchant, in catalog order.
pub fn offers_for(merchant_id: &str) -> impl Iterator<Item = &'static Offer> {
    OFFERS.iter().filter(move |o| o.merchant_id == merchant_id)
}

/// First of the merchant's offers whose name or short text appears in the
/// input.
pub fn find_offer_mention(input: &str, merchant_id: &str) -> Option<&'static Offer> {
    let lowered = input.to_lowercase();
    offers_for(merchant_id).find(|o| {
        lowered.contains(&o.name.to_lowercase()) || lowered.contains(&o.short_text.to_lowercase())
    })
}

pub fn offer_by_id(id: &str) -> Option<&'static Offer> {
    OFFERS.iter().find(|o| o.id == id)
}

pub fn media_type(id: &str) -> Option<&'static MediaType> {
    MEDIA_TYPES.iter().find(|m| m.id == id)
}

/// Comma-separated display names, for prompt text.
pub fn merchant_names() -> String {
    MERCHANTS
        .iter()
        .map(|m| m.dba)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Media-type preference mentioned in the input, if any.
///
/// "banner" alone means a display banner; "double decker" beats it; "image"
/// or "visual" without a specific format keeps both image formats open and
/// resolves to the default display banner.
pub fn find_media_type_mention(input: &str) -> Option<&'static MediaType> {
    let lowered = input.to_lowercase();
    if lowered.contains("double decker") || lowered.contains("double-decker") {
        media_type("double_decker")
    } else if lowered.contains("banner") {
        media_type("display_banner")
    } else if lowered.contains("text") || lowered.contains("native") {
        media_type("native")
    } else if lowered.contains("image") || lowered.contains("visual") {
        media_type("display_banner")
    } else {
        None
    }
}
