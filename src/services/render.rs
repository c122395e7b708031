//! HTML rendering of the add-to-cart page.

use crate::models::form::{FieldDescriptor, FieldKind, FormDefinition, FormErrors};
use crate::models::product::{AddToCart, FieldValue};
use crate::services::form_builder::TOKEN_FIELD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }
}

/// Everything one page render needs.
pub struct PageView<'a> {
    pub form: &'a FormDefinition,
    pub model: &'a AddToCart,
    pub errors: &'a FormErrors,
    pub csrf_token: Option<&'a str>,
    pub banners: Vec<Banner>,
    pub action: &'a str,
    /// Declared defaults fill empty fields only on an unsubmitted form.
    pub submitted: bool,
}

pub fn page(view: &PageView<'_>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Product</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 480px;
            margin: 40px auto;
            color: #111827;
        }}
        .banner {{ padding: 12px 16px; border-radius: 6px; margin-bottom: 16px; }}
        .banner-success {{ background: #ecfdf5; border: 1px solid #10b981; }}
        .banner-error {{ background: #fef2f2; border: 1px solid #ef4444; }}
        .field {{ margin-bottom: 16px; }}
        label {{ display: block; font-weight: 600; margin-bottom: 4px; }}
        ul.errors {{ color: #b91c1c; margin: 4px 0 0; padding-left: 18px; }}
    </style>
</head>
<body>
{}{}</body>
</html>
"#,
        banners(view),
        form(view)
    )
}

fn banners(view: &PageView<'_>) -> String {
    let mut html = String::new();
    for banner in &view.banners {
        let class = match banner.kind {
            BannerKind::Success => "banner banner-success",
            BannerKind::Error => "banner banner-error",
        };
        html.push_str(&format!(
            "    <div class=\"{}\" role=\"status\">{}</div>\n",
            class,
            html_escape(&banner.message)
        ));
    }
    for message in &view.errors.form {
        html.push_str(&format!(
            "    <div class=\"banner banner-error\" role=\"alert\">{}</div>\n",
            html_escape(message)
        ));
    }
    html
}

fn form(view: &PageView<'_>) -> String {
    let mut html = format!(
        "    <form method=\"post\" name=\"{}\" action=\"{}\">\n",
        view.form.name,
        html_escape(view.action)
    );
    for field in &view.form.fields {
        html.push_str(&field_row(view, field));
    }
    if let Some(token) = view.csrf_token {
        html.push_str(&format!(
            "        <input type=\"hidden\" id=\"{}\" name=\"{}\" value=\"{}\">\n",
            view.form.id(TOKEN_FIELD),
            view.form.full_name(TOKEN_FIELD),
            html_escape(token)
        ));
    }
    html.push_str("    </form>\n");
    html
}

fn field_row(view: &PageView<'_>, field: &FieldDescriptor) -> String {
    let id = view.form.id(field.name);
    let name = view.form.full_name(field.name);

    if let FieldKind::Submit = field.kind {
        return format!(
            concat!(
                "        <div class=\"field\">\n",
                "            <button type=\"submit\" id=\"{}\" name=\"{}\">{}</button>\n",
                "        </div>\n",
            ),
            id,
            name,
            html_escape(field.label)
        );
    }

    let value = current_value(view, field);
    let widget = match &field.kind {
        FieldKind::Integer => {
            let mut attrs = String::new();
            for (key, val) in &field.attrs {
                attrs.push_str(&format!(" {}=\"{}\"", key, html_escape(val)));
            }
            format!(
                "<input type=\"number\" id=\"{}\" name=\"{}\" value=\"{}\" required{}>",
                id,
                name,
                html_escape(value.as_deref().unwrap_or("")),
                attrs
            )
        }
        FieldKind::Choice(choices) => {
            let mut options =
                String::from("\n                <option value=\"\">Choose an option</option>");
            for choice in choices {
                let selected = if value.as_deref() == Some(choice.value.as_str()) {
                    " selected"
                } else {
                    ""
                };
                options.push_str(&format!(
                    "\n                <option value=\"{}\"{}>{}</option>",
                    html_escape(&choice.value),
                    selected,
                    html_escape(choice.label)
                ));
            }
            format!(
                "<select id=\"{}\" name=\"{}\" required>{}\n            </select>",
                id, name, options
            )
        }
        FieldKind::Submit => String::new(),
    };

    format!(
        concat!(
            "        <div class=\"field\">\n",
            "            <label for=\"{}\">{}</label>\n",
            "            {}\n",
            "{}        </div>\n",
        ),
        id,
        html_escape(field.label),
        widget,
        error_list(view.errors.for_field(field.name))
    )
}

fn error_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let mut html = String::from("            <ul class=\"errors\">\n");
    for message in messages {
        html.push_str(&format!("                <li>{}</li>\n", html_escape(message)));
    }
    html.push_str("            </ul>\n");
    html
}

/// Value to pre-fill: what the model holds, else the declared default.
fn current_value(view: &PageView<'_>, field: &FieldDescriptor) -> Option<String> {
    match view.model.value(field.name) {
        Some(FieldValue::Integer(n)) => Some(n.to_string()),
        Some(FieldValue::Text(s)) => Some(s.to_string()),
        None if view.submitted => None,
        None => field.default.clone(),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::form_builder::add_to_cart_form;

    fn render(model: &AddToCart, errors: &FormErrors, token: Option<&str>) -> String {
        let form = add_to_cart_form();
        page(&PageView {
            form: &form,
            model,
            errors,
            csrf_token: token,
            banners: Vec::new(),
            action: "/product",
            submitted: model != &AddToCart::default(),
        })
    }

    #[test]
    fn unsubmitted_empty_quantity_uses_declared_default() {
        let form = add_to_cart_form();
        let model = AddToCart {
            quantity: None,
            color: None,
        };
        let html = page(&PageView {
            form: &form,
            model: &model,
            errors: &FormErrors::default(),
            csrf_token: None,
            banners: vec![Banner::success("Added")],
            action: "/product",
            submitted: false,
        });
        assert!(html.contains(r#"name="add_to_cart[quantity]" value="1""#));
        assert!(html.contains(r#"<div class="banner banner-success" role="status">Added</div>"#));
    }

    #[test]
    fn empty_form_prefills_quantity_and_leaves_color_blank() {
        let html = render(&AddToCart::default(), &FormErrors::default(), Some("tok"));

        assert!(html.contains(
            r#"name="add_to_cart[quantity]" value="1" required min="1" max="10""#
        ));
        assert!(html.contains(r#"<option value="">Choose an option</option>"#));
        assert!(!html.contains("selected"));
        assert!(html.contains(r#"name="add_to_cart[_token]" value="tok""#));
        assert!(html.contains(">Add to Cart</button>"));
        assert!(!html.contains("class=\"errors\""));
    }

    #[test]
    fn fields_render_in_declared_order() {
        let html = render(&AddToCart::default(), &FormErrors::default(), None);
        let quantity = html.find("Quantity").expect("quantity label");
        let color = html.find("Select Color").expect("color label");
        let submit = html.find("Add to Cart").expect("submit button");
        assert!(quantity < color && color < submit);
    }

    #[test]
    fn invalid_submission_keeps_values_and_shows_errors() {
        let model = AddToCart {
            quantity: Some(15),
            color: Some("white".to_string()),
        };
        let mut errors = FormErrors::default();
        errors.add_field("quantity", "must be between 1 and 10");

        let html = render(&model, &errors, None);
        assert!(html.contains(r#"value="15""#));
        assert!(html.contains(r#"<option value="white" selected>Pearl White</option>"#));
        assert!(html.contains("<li>must be between 1 and 10</li>"));
    }

    #[test]
    fn cleared_quantity_does_not_fall_back_to_default() {
        let model = AddToCart {
            quantity: None,
            color: Some("black".to_string()),
        };
        let html = render(&model, &FormErrors::default(), None);
        assert!(html.contains(r#"name="add_to_cart[quantity]" value="""#));
    }

    #[test]
    fn dynamic_text_is_escaped() {
        let model = AddToCart {
            quantity: Some(1),
            color: Some("<script>".to_string()),
        };
        let mut errors = FormErrors::default();
        errors.add_form("bad \"input\"");
        let html = render(&model, &errors, None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("bad &quot;input&quot;"));
    }
}
