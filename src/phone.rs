//! Phone candidate generation
//! Pure, deterministic expansion of one raw phone value into the normalized
//! forms worth probing against the order search

/// Minimum digit count before stripping a two-digit country code;
/// guards against producing a too-short local form
const MIN_FOLDABLE_LEN: usize = 10;

/// Generate the ordered, deduplicated set of normalized candidates for a raw
/// phone value. Order is the tie-break key for concurrent probing, so it is
/// fixed: digits-only, `+`-prefixed, `00`-prefixed, FR local fold,
/// FR international forms for a 10-digit local number, then BE and CH folds.
/// Empty or digit-free input yields an empty set.
pub fn candidates(raw: &str) -> Vec<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    push_unique(&mut out, digits.clone());
    push_unique(&mut out, format!("+{}", digits));
    push_unique(&mut out, format!("00{}", digits));

    // 33xxxxxxxxx -> 0xxxxxxxxx
    if digits.starts_with("33") && digits.len() >= MIN_FOLDABLE_LEN {
        push_unique(&mut out, format!("0{}", &digits[2..]));
    }

    // 0xxxxxxxxx (10 digits) -> 33xxxxxxxxx and +33xxxxxxxxx
    if digits.starts_with('0') && digits.len() == 10 {
        push_unique(&mut out, format!("33{}", &digits[1..]));
        push_unique(&mut out, format!("+33{}", &digits[1..]));
    }

    // Same local fold for Belgium and Switzerland
    for code in ["32", "41"] {
        if digits.starts_with(code) && digits.len() >= MIN_FOLDABLE_LEN {
            push_unique(&mut out, format!("0{}", &digits[code.len()..]));
        }
    }

    out
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if !out.contains(&candidate) {
        out.push(candidate);
    }
}
