//! Email templates for invitation delivery.

/// Content of an invitation email.
pub struct InviteEmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl InviteEmailContent {
    pub fn new(project_name: &str, inviter_name: &str, accept_link: &str) -> Self {
        Self {
            subject: format!("{inviter_name} invited you to join {project_name}"),
            text: Self::text_template(project_name, inviter_name, accept_link),
            html: Self::html_template(project_name, inviter_name, accept_link),
        }
    }

    fn text_template(project_name: &str, inviter_name: &str, accept_link: &str) -> String {
        format!(
            r#"Hi,

{inviter_name} has invited you to collaborate on the project "{project_name}".

Accept the invitation here:

{accept_link}

The invitation expires in 7 days. If you weren't expecting it, you can
safely ignore this email.

--
The TaskLink Team"#
        )
    }

    fn html_template(project_name: &str, inviter_name: &str, accept_link: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; background: #f5f5f5; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 40px 20px; }}
        .card {{ background: white; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        h1 {{ color: #1a1a1a; margin-top: 0; font-size: 24px; }}
        .button {{ display: inline-block; padding: 12px 28px; background: #2563eb; color: #fff; border-radius: 6px; text-decoration: none; font-weight: bold; margin: 24px 0; }}
        .expires {{ color: #666; font-size: 14px; }}
        .footer {{ margin-top: 32px; padding-top: 20px; border-top: 1px solid #eee; color: #888; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="card">
            <h1>You're invited</h1>
            <p>{inviter_name} has invited you to collaborate on <strong>{project_name}</strong>.</p>
            <p><a class="button" href="{accept_link}">Accept invitation</a></p>
            <p class="expires">This invitation expires in 7 days.</p>
            <div class="footer">
                <p>If you weren't expecting this invitation, you can safely ignore this email.</p>
                <p>The TaskLink Team</p>
            </div>
        </div>
    </div>
</body>
</html>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_carries_link_and_names() {
        let content = InviteEmailContent::new(
            "Website Redesign",
            "Ada",
            "https://app.example.com/invite/accept?token=abc&project=1",
        );

        assert!(content.subject.contains("Website Redesign"));
        assert!(content.subject.contains("Ada"));
        assert!(content.text.contains("https://app.example.com/invite/accept?token=abc&project=1"));
        assert!(content.html.contains("https://app.example.com/invite/accept?token=abc&project=1"));
    }

    #[test]
    fn html_is_a_full_document() {
        let content = InviteEmailContent::new("P", "I", "https://x/invite/accept?token=t&project=2");

        assert!(content.html.contains("<!DOCTYPE html>"));
        assert!(content.html.contains("expires in 7 days"));
        assert!(content.text.contains("expires in 7 days"));
    }
}
