/// Converts an external column name such as `PartyId` or `AssetManagerId`
/// to its internal snake form.
///
/// Acronym runs stay together: a separator is inserted only at a
/// lower-to-upper boundary or before the last capital of a run that is
/// followed by lowercase.
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len() + 4);

    for (index, &current) in chars.iter().enumerate() {
        if current.is_uppercase() {
            let after_lower = index > 0
                && (chars[index - 1].is_lowercase() || chars[index - 1].is_ascii_digit());
            let ends_acronym = index > 0
                && chars[index - 1].is_uppercase()
                && chars.get(index + 1).is_some_and(|next| next.is_lowercase());

            if after_lower || ends_acronym {
                output.push('_');
            }
            output.extend(current.to_lowercase());
        } else {
            output.push(current);
        }
    }

    output
}
