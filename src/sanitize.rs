// ============================================================================
// Input Sanitization
// ============================================================================
//
// Bounded normalization for untrusted form input. All functions are total:
// they never fail, they only narrow.
//
// ============================================================================

/// Normalizes an untrusted string: strips `<` and `>`, trims and collapses
/// interior whitespace runs to a single space, then truncates to `max_len`
/// characters.
pub fn sanitize_text(input: &str, max_len: usize) -> String {
    let stripped: String = input.chars().filter(|c| *c != '<' && *c != '>').collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_len).collect()
}

/// Normalizes and validates an email address against a conservative
/// `local@domain.tld` shape. Returns an empty string on mismatch, which
/// callers treat the same as a missing required field.
pub fn sanitize_email(input: &str) -> String {
    let candidate = sanitize_text(input, 254).to_lowercase();
    if is_plausible_email(&candidate) {
        candidate
    } else {
        String::new()
    }
}

/// Strips everything but ASCII digits and caps the result at 20 digits.
pub fn sanitize_phone(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).take(20).collect()
}

// Deliberately conservative: ASCII local part, dotted domain, 2+ letter TLD.
// Not an RFC 5322 parser.
fn is_plausible_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
        return false;
    }
    let Some((head, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    if head.is_empty()
        || !head
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
