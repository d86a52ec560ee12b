//! Preview and export transformations for submitted component code.
//!
//! `check_preview_code` screens source text against a fixed denylist of
//! patterns (cookie access, token reads, dynamic code execution, script
//! injection) before the client renders it. This is a best-effort UX
//! guard, NOT a security boundary: a regex blocklist cannot contain
//! untrusted code, and anything that actually executes submitted code
//! needs a real isolation mechanism (a separate process or VM sandbox).
//! Treat a pass here as "probably not accidentally harmful", nothing more.

use crate::models::component::PreviewTheme;
use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

struct DenyRule {
    pattern: Regex,
    name: &'static str,
}

fn rule(pattern: &str, case_insensitive: bool, name: &'static str) -> DenyRule {
    DenyRule {
        pattern: RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .expect("invalid denylist pattern"),
        name,
    }
}

static DENYLIST: Lazy<Vec<DenyRule>> = Lazy::new(|| {
    vec![
        rule(r"document\.cookie", true, "Cookie access"),
        rule(
            r#"localStorage\.(getItem|setItem).*['"]token['"]"#,
            true,
            "Token theft",
        ),
        rule(r"\beval\s*\(", true, "eval() execution"),
        rule(r"new\s+Function\s*\(", false, "Function constructor"),
        rule(r"<script[\s>]", true, "Script injection"),
        rule(r"javascript:\s*void", true, "JavaScript protocol"),
    ]
});

/// Screen code against the denylist. Returns the human-readable name of
/// the first matching rule, or `Ok(())` when nothing matched.
pub fn check_preview_code(code: &str) -> Result<(), &'static str> {
    for rule in DENYLIST.iter() {
        if rule.pattern.is_match(code) {
            return Err(rule.name);
        }
    }
    Ok(())
}

static EXPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| Regex::new(r"export\s+default\s+").unwrap());
static LEADING_FUNCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^function\s+(\w+)").unwrap());
static LEADING_CONST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^const\s+(\w+)\s*=").unwrap());

/// Rewrite a trailing `export default` declaration into an explicit
/// `render(<Name />)` invocation understood by the sandbox renderer,
/// which does not support module syntax.
pub fn prepare_preview_code(code: &str) -> String {
    let trimmed = code.trim();
    if !trimmed.contains("export default") {
        return trimmed.to_string();
    }

    let stripped = EXPORT_DEFAULT.replace(trimmed, "").into_owned();

    let name = LEADING_FUNCTION
        .captures(&stripped)
        .or_else(|| LEADING_CONST.captures(&stripped))
        .map(|c| c[1].to_string());

    match name {
        Some(name) => format!("{}\n\nrender(<{} />);", stripped, name),
        None => stripped,
    }
}

/// House class -> portable Tailwind substitutions, applied to whole class
/// tokens inside `className` strings.
const CLASS_MAPPINGS: &[(&str, &str)] = &[
    // Surface/background
    (
        "surface",
        "bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700",
    ),
    ("bg-surface", "bg-white dark:bg-gray-800"),
    ("bg-light-surface", "bg-gray-50"),
    ("bg-dark-surface", "bg-gray-800"),
    ("bg-light-bg", "bg-gray-100"),
    ("bg-dark-bg", "bg-gray-900"),
    // Text
    ("text-accent", "text-teal-500 dark:text-teal-400"),
    ("text-primary", "text-gray-900 dark:text-white"),
    ("text-secondary", "text-gray-600 dark:text-gray-400"),
    ("text-light-text", "text-gray-900"),
    ("text-dark-text", "text-white"),
    ("text-light-muted", "text-gray-500"),
    ("text-dark-muted", "text-gray-400"),
    // Borders
    ("border-theme", "border-gray-200 dark:border-gray-700"),
    ("border-accent", "border-teal-500 dark:border-teal-400"),
    ("border-light-border", "border-gray-200"),
    ("border-dark-border", "border-gray-700"),
    // Buttons
    (
        "btn-accent",
        "bg-teal-500 hover:bg-teal-600 text-white font-medium px-4 py-2 rounded-md transition-colors",
    ),
    (
        "btn-primary",
        "bg-blue-500 hover:bg-blue-600 text-white font-medium px-4 py-2 rounded-md transition-colors",
    ),
    (
        "btn-secondary",
        "bg-gray-500 hover:bg-gray-600 text-white font-medium px-4 py-2 rounded-md transition-colors",
    ),
    // Effects
    ("glow-accent", "shadow-lg shadow-teal-500/50"),
    ("glow-purple", "shadow-lg shadow-purple-500/50"),
    ("glow-cyan", "shadow-lg shadow-cyan-500/50"),
    // Gradients
    ("gradient-accent", "bg-gradient-to-r from-teal-400 to-cyan-500"),
    (
        "gradient-signature",
        "bg-gradient-to-r from-teal-400 via-purple-500 to-pink-500",
    ),
    (
        "bg-gradient-signature",
        "bg-gradient-to-r from-teal-400 via-purple-500 to-pink-500",
    ),
    // Neon colors
    ("text-neon-cyan", "text-cyan-400"),
    ("text-neon-purple", "text-purple-400"),
    ("text-neon-pink", "text-pink-400"),
    ("text-neon-green", "text-green-400"),
    ("text-neon-red", "text-red-400"),
    ("bg-neon-cyan", "bg-cyan-500"),
    ("bg-neon-purple", "bg-purple-500"),
    ("bg-neon-pink", "bg-pink-500"),
];

/// CSS variable -> hex color substitutions, per theme.
const LIGHT_COLORS: &[(&str, &str)] = &[
    ("var(--accent)", "#1ABC9C"),
    ("var(--surface)", "#FFFFFF"),
    ("var(--bg)", "#F5F7FA"),
    ("var(--text)", "#1F2937"),
    ("var(--border)", "#E5E7EB"),
    ("var(--muted)", "#6B7280"),
    ("var(--neon-cyan)", "#00D9FF"),
    ("var(--neon-purple)", "#A855F7"),
    ("var(--neon-pink)", "#EC4899"),
    ("var(--neon-green)", "#10B981"),
    ("var(--neon-red)", "#EF4444"),
];

const DARK_COLORS: &[(&str, &str)] = &[
    ("var(--accent)", "#00FFC6"),
    ("var(--surface)", "#1F1F23"),
    ("var(--bg)", "#0F0F11"),
    ("var(--text)", "#E0E0E0"),
    ("var(--border)", "#2A2A2E"),
    ("var(--muted)", "#9CA3AF"),
    ("var(--neon-cyan)", "#00FFFF"),
    ("var(--neon-purple)", "#C084FC"),
    ("var(--neon-pink)", "#F472B6"),
    ("var(--neon-green)", "#34D399"),
    ("var(--neon-red)", "#F87171"),
];

static CLASS_NAME_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"className=(["'])([^"']*)(["'])"#).unwrap());

fn map_class_token(token: &str) -> &str {
    CLASS_MAPPINGS
        .iter()
        .find(|(house, _)| *house == token)
        .map(|(_, generic)| *generic)
        .unwrap_or(token)
}

/// Replace house class names with portable equivalents inside every
/// `className` attribute. Unknown tokens pass through untouched.
pub fn convert_classes_to_generic(code: &str) -> String {
    CLASS_NAME_ATTR
        .replace_all(code, |caps: &Captures| {
            let mapped = caps[2]
                .split_whitespace()
                .map(map_class_token)
                .collect::<Vec<_>>()
                .join(" ");
            format!("className={}{}{}", &caps[1], mapped, &caps[3])
        })
        .into_owned()
}

/// Replace `var(--*)` references with theme-resolved hex colors.
pub fn convert_css_variables(code: &str, theme: PreviewTheme) -> String {
    let table = match theme {
        PreviewTheme::Light => LIGHT_COLORS,
        PreviewTheme::Dark => DARK_COLORS,
    };
    let mut out = code.to_string();
    for (var, hex) in table {
        out = out.replace(var, hex);
    }
    out
}

/// Produce the portable Tailwind variant of a house-styled component:
/// class substitution, CSS variable resolution, and an explanatory
/// header comment.
pub fn to_generic_tailwind(code: &str, theme: PreviewTheme) -> String {
    let converted = convert_css_variables(&convert_classes_to_generic(code), theme);
    format!(
        "/*\n * Converted to generic Tailwind CSS: custom classes and CSS\n * variables have been replaced with standard utilities.\n * Theme: {}\n */\n\n{}",
        theme.as_str(),
        converted
    )
}

static ANY_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:export\s+default\s+)?function\s+([A-Z][a-zA-Z0-9]*)").unwrap());
static ANY_CONST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:export\s+)?const\s+([A-Z][a-zA-Z0-9]*)\s*=").unwrap());

/// Best-effort component name extraction for export file naming.
pub fn extract_component_name(code: &str) -> String {
    ANY_FUNCTION
        .captures(code)
        .or_else(|| ANY_CONST.captures(code))
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "Component".to_string())
}

/// README content for an exported component bundle.
pub fn generate_readme(component_name: &str, description: &str) -> String {
    format!(
        "# {name}\n\n{description}\n\n## Prerequisites\n\n- React 18+\n- Tailwind CSS 3+\n\n## Usage\n\n```jsx\nimport {name} from './{name}';\n\nfunction App() {{\n  return <{name} />;\n}}\n```\n\nThe `.styled.jsx` file depends on the house theme stylesheet; the\n`.generic.jsx` file uses only standard Tailwind utilities and needs no\nextra setup. Adjust the classes to match your design system.\n",
        name = component_name,
        description = description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::component::PreviewTheme;

    #[test]
    fn test_denylist_blocks_cookie_access() {
        let code = "const x = document.cookie;";
        assert_eq!(check_preview_code(code), Err("Cookie access"));
    }

    #[test]
    fn test_denylist_blocks_eval() {
        assert_eq!(check_preview_code("eval('1+1')"), Err("eval() execution"));
        assert_eq!(check_preview_code("Eval ('x')"), Err("eval() execution"));
    }

    #[test]
    fn test_denylist_blocks_token_read() {
        let code = "const t = localStorage.getItem('token');";
        assert_eq!(check_preview_code(code), Err("Token theft"));
    }

    #[test]
    fn test_denylist_blocks_script_tag() {
        assert_eq!(
            check_preview_code("<script>alert(1)</script>"),
            Err("Script injection")
        );
    }

    #[test]
    fn test_denylist_blocks_function_constructor() {
        assert_eq!(
            check_preview_code("const f = new Function('return 1');"),
            Err("Function constructor")
        );
    }

    #[test]
    fn test_denylist_allows_plain_component() {
        let code = "export default function Button() { return <button>Go</button>; }";
        assert!(check_preview_code(code).is_ok());
    }

    #[test]
    fn test_denylist_allows_evaluate_identifier() {
        // `eval` requires a word boundary and an open paren
        assert!(check_preview_code("const evaluated = medieval(x);").is_ok());
    }

    #[test]
    fn test_prepare_rewrites_default_function() {
        let code = "export default function Button() {\n  return <button />;\n}";
        let out = prepare_preview_code(code);
        assert!(out.starts_with("function Button()"));
        assert!(out.ends_with("render(<Button />);"));
    }

    #[test]
    fn test_prepare_rewrites_default_const() {
        let code = "const Card = () => <div />;\n\nexport default Card;";
        let out = prepare_preview_code(code);
        assert!(out.starts_with("const Card"));
        assert!(out.ends_with("render(<Card />);"));
    }

    #[test]
    fn test_prepare_leaves_plain_code_alone() {
        let code = "function Button() { return <button />; }";
        assert_eq!(prepare_preview_code(code), code);
    }

    #[test]
    fn test_prepare_anonymous_default_gets_no_render_call() {
        let code = "export default () => <div />;";
        let out = prepare_preview_code(code);
        assert!(!out.contains("render("));
        assert!(!out.contains("export default"));
    }

    #[test]
    fn test_class_substitution_whole_tokens() {
        let code = r#"<div className="surface p-4">"#;
        let out = convert_classes_to_generic(code);
        assert!(out.contains("bg-white dark:bg-gray-800"));
        assert!(out.contains("p-4"));
        assert!(!out.contains(r#""surface"#));
    }

    #[test]
    fn test_class_substitution_does_not_split_compounds() {
        // `bg-surface` must map as its own token, not via the `surface` rule
        let code = r#"<div className="bg-surface">"#;
        let out = convert_classes_to_generic(code);
        assert!(out.contains(r#"className="bg-white dark:bg-gray-800""#));
    }

    #[test]
    fn test_class_substitution_outside_classname_untouched() {
        let code = r#"const note = "surface";"#;
        assert_eq!(convert_classes_to_generic(code), code);
    }

    #[test]
    fn test_css_variables_theme_resolution() {
        let code = "color: var(--accent);";
        assert_eq!(
            convert_css_variables(code, PreviewTheme::Dark),
            "color: #00FFC6;"
        );
        assert_eq!(
            convert_css_variables(code, PreviewTheme::Light),
            "color: #1ABC9C;"
        );
    }

    #[test]
    fn test_generic_variant_carries_header() {
        let out = to_generic_tailwind("<div />", PreviewTheme::Light);
        assert!(out.starts_with("/*"));
        assert!(out.contains("Theme: light"));
        assert!(out.ends_with("<div />"));
    }

    #[test]
    fn test_extract_component_name_function() {
        assert_eq!(
            extract_component_name("export default function NavBar() {}"),
            "NavBar"
        );
    }

    #[test]
    fn test_extract_component_name_const() {
        assert_eq!(
            extract_component_name("const PricingCard = () => null;"),
            "PricingCard"
        );
    }

    #[test]
    fn test_extract_component_name_fallback() {
        assert_eq!(extract_component_name("const x = 1;"), "Component");
    }

    #[test]
    fn test_generate_readme_mentions_name() {
        let readme = generate_readme("NavBar", "A responsive navbar.");
        assert!(readme.starts_with("# NavBar"));
        assert!(readme.contains("A responsive navbar."));
        assert!(readme.contains("import NavBar"));
    }
}
