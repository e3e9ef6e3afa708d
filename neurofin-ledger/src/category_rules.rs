//! Deterministic category rules mapping free-text descriptions
//! to the coach's spending categories and their display emoji.
//!
//! Keyword matching over the uppercased description; first match wins.
//! Brand names match anywhere, short generic words only as whole words.

/// Result of categorization
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGuess {
    pub category: String,
    pub emoji: String,
}

/// Fallback bucket for descriptions no rule recognizes.
pub const OTHER: &str = "Other";

/// Categorize a transaction description.
/// Priority: delivery > groceries > transport > subscriptions > housing >
/// entertainment > shopping > other.
pub fn categorize(description: &str) -> CategoryGuess {
    let desc = description.to_uppercase();
    let words: Vec<&str> = desc.split(|c: char| !c.is_alphanumeric()).collect();
    let word = |w: &str| words.iter().any(|x| *x == w);

    // Delivery before transport: "UBER EATS" also contains "UBER"
    if desc.contains("UBER EATS") || desc.contains("DELIVEROO")
        || desc.contains("DOORDASH") || desc.contains("WOLT")
        || desc.contains("JUST EAT") || desc.contains("LIEFERANDO")
        || desc.contains("GLOVO") || desc.contains("DELIVERY")
    {
        return guess("Food Delivery", "🍕");
    }

    if desc.contains("LIDL") || desc.contains("ALDI")
        || desc.contains("REWE") || desc.contains("CARREFOUR")
        || desc.contains("TESCO") || desc.contains("SUPERMARKET")
        || desc.contains("GROCER")
    {
        return guess("Groceries", "🛒");
    }

    if desc.contains("UBER") || word("BOLT")
        || word("TAXI") || word("TRAIN")
        || word("METRO") || word("BUS")
        || desc.contains("FUEL") || desc.contains("PARKING")
        || word("SHELL") || desc.contains("TRANSPORT")
    {
        return guess("Transport", "🚗");
    }

    if desc.contains("SPOTIFY") || desc.contains("NETFLIX")
        || desc.contains("DISNEY") || desc.contains("YOUTUBE")
        || desc.contains("ICLOUD") || desc.contains("SUBSCRIPTION")
        || word("GYM")
    {
        return guess("Subscriptions", "🎵");
    }

    if word("RENT") || word("LEASE")
        || desc.contains("LANDLORD") || desc.contains("ELECTRICITY")
        || desc.contains("UTILIT")
    {
        return guess("Housing", "🏠");
    }

    if desc.contains("CINEMA") || desc.contains("CONCERT")
        || desc.contains("TICKET") || desc.contains("STEAM")
        || word("BAR") || word("PUB")
    {
        return guess("Entertainment", "🎬");
    }

    if desc.contains("AMAZON") || desc.contains("ZALANDO")
        || desc.contains("NIKE") || desc.contains("H&M")
        || desc.contains("ZARA") || desc.contains("IKEA")
        || desc.contains("SHOP")
    {
        return guess("Shopping", "🛍️");
    }

    guess(OTHER, "💳")
}

fn guess(category: &str, emoji: &str) -> CategoryGuess {
    CategoryGuess {
        category: category.to_string(),
        emoji: emoji.to_string(),
    }
}
