/// Join the present, non-empty class names with single spaces
pub fn class_names<'a, I>(classes: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut out = String::new();
    for class in classes.into_iter().flatten() {
        let class = class.trim();
        if class.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(class);
    }
    out
}
