// build.rs
//
// Generates the `t!` macro from `locales/<lang>.toml`. English is always loaded
// first and a selected language only overrides the keys it defines.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

const FALLBACK_LANG: &str = "en";

fn main() {
    let lang = select_language();
    println!("cargo:rustc-env=KRILL_LANG_EFFECTIVE={}", lang);

    println!("cargo:rerun-if-env-changed=KRILL_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    let mut translations = read_locale(FALLBACK_LANG)
        .unwrap_or_else(|| panic!("Missing fallback locale: locales/{}.toml", FALLBACK_LANG));

    if lang != FALLBACK_LANG {
        match read_locale(&lang) {
            Some(specific) => translations.extend(specific),
            None => println!(
                "cargo:warning=Locale 'locales/{}.toml' not found. Falling back to '{}'.",
                lang, FALLBACK_LANG
            ),
        }
    }

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is always set by cargo");
    let dest_path = Path::new(&out_dir).join("translations.rs");
    fs::write(&dest_path, render_macro(&translations)).expect("Failed to write translations.rs");
}

/// `lang_*` features win over the `KRILL_LANG` variable, which wins over English.
fn select_language() -> String {
    let mut active_langs: Vec<String> = env::vars()
        .filter_map(|(key, _)| {
            key.strip_prefix("CARGO_FEATURE_LANG_")
                .map(str::to_lowercase)
        })
        .collect();
    active_langs.sort();

    match active_langs.first() {
        Some(first) => {
            if active_langs.len() > 1 {
                println!(
                    "cargo:warning=Multiple language features enabled ({:?}). Using '{}'.",
                    active_langs, first
                );
            }
            first.clone()
        }
        None => env::var("KRILL_LANG").unwrap_or_else(|_| FALLBACK_LANG.to_string()),
    }
}

fn read_locale(lang: &str) -> Option<BTreeMap<String, String>> {
    let path = format!("locales/{}.toml", lang);
    let content = fs::read_to_string(&path).ok()?;
    let parsed = toml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e));
    Some(parsed)
}

fn render_macro(translations: &BTreeMap<String, String>) -> String {
    let mut macro_code = String::from("#[macro_export]\nmacro_rules! t {\n");
    for (key, value) in translations {
        let escaped_value = value.replace('\\', "\\\\").replace('"', "\\\"");
        macro_code.push_str(&format!("    (\"{}\") => {{ \"{}\" }};\n", key, escaped_value));
    }
    // Unknown keys fail the build instead of printing a raw key at runtime.
    macro_code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    macro_code.push('}');
    macro_code
}
