//! Component shell: the markup wrapped around the posts container.

/// Wraps inner content in the component's templated container and outer shell.
pub trait Shell: Send + Sync {
    /// Wrap content in the templated content area.
    fn wrap_area(&self, markup: &str) -> String;

    /// Wrap an area in the outer component shell.  `state_classes` are added to
    /// the wrapper element.
    fn wrap_component(&self, markup: &str, state_classes: &[&str]) -> String;

    /// Class that identifies the wrapper element.
    fn wrapper_class(&self) -> &str;

    /// Prefix for state classes such as `--loading` and `--error`.
    fn css_prefix(&self) -> &str;

    fn loading_class(&self) -> String {
        format!("{}--loading", self.css_prefix())
    }

    fn error_class(&self) -> String {
        format!("{}--error", self.css_prefix())
    }
}

/// The standard `wpc-component` shell.
#[derive(Debug, Clone)]
pub struct ComponentShell {
    component_id: String,
    css_prefix: String,
}

impl ComponentShell {
    pub fn new(component_id: impl Into<String>) -> Self {
        let component_id = component_id.into();
        Self {
            css_prefix: format!("wpc-{component_id}"),
            component_id,
        }
    }
}

impl Default for ComponentShell {
    fn default() -> Self {
        Self::new("blog")
    }
}

impl Shell for ComponentShell {
    fn wrap_area(&self, markup: &str) -> String {
        format!(r#"<div class="wpc-component__area">{markup}</div>"#)
    }

    fn wrap_component(&self, markup: &str, state_classes: &[&str]) -> String {
        let mut classes = format!(
            "wpc-component wpc-component--{} {}",
            self.component_id,
            self.wrapper_class()
        );
        for class in state_classes {
            classes.push(' ');
            classes.push_str(class);
        }
        format!(r#"<div class="{classes}">{markup}</div>"#)
    }

    fn wrapper_class(&self) -> &str {
        "wpc-component__wrapper"
    }

    fn css_prefix(&self) -> &str {
        &self.css_prefix
    }
}
