//! Compiled Tera templates and the `url()` function they build links with.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera, Value};
use uuid::Uuid;

use crate::middleware::auth::Identity;
use crate::urls::{self, names};

/// Template set shared by every worker.
#[derive(Clone)]
pub struct Templates {
    tera: Arc<Tera>,
}

impl Templates {
    /// Compile every `*.html` file under `dir`. Template names are paths
    /// relative to `dir`, e.g. `posts/index.html`.
    pub fn load(dir: &str) -> Result<Self, tera::Error> {
        let glob = format!("{}/**/*.html", dir.trim_end_matches('/'));
        let mut tera = Tera::new(&glob)?;
        tera.autoescape_on(vec![".html"]);
        tera.register_function("url", UrlFor);

        tracing::info!(
            dir,
            count = tera.get_template_names().count(),
            "Templates loaded"
        );
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Render `template` with the view context plus the visiting `user`.
    pub fn render<C: Serialize>(
        &self,
        template: &str,
        context: &C,
        user: Option<&Identity>,
    ) -> Result<String, tera::Error> {
        let mut ctx = Context::from_serialize(context)?;
        ctx.insert("user", &user);
        self.tera.render(template, &ctx)
    }
}

fn string_arg(args: &HashMap<String, Value>, key: &str) -> tera::Result<String> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(tera::Error::msg(format!("url(): missing argument `{key}`"))),
    }
}

fn post_id_arg(args: &HashMap<String, Value>) -> tera::Result<Uuid> {
    let raw = string_arg(args, "post_id")?;
    Uuid::parse_str(&raw)
        .map_err(|_| tera::Error::msg(format!("url(): `{raw}` is not a post id")))
}

/// `{{ url(name="posts:profile", username=author.username) }}`
///
/// Output is percent-encoded, so it is never HTML-escaped.
struct UrlFor;

impl tera::Function for UrlFor {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        url_for(args)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

fn url_for(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let name = string_arg(args, "name")?;
    let url = match name.as_str() {
        names::INDEX => urls::index(),
        names::GROUP_LIST => urls::group_list(&string_arg(args, "slug")?),
        names::PROFILE => urls::profile(&string_arg(args, "username")?),
        names::PROFILE_FOLLOW => urls::profile_follow(&string_arg(args, "username")?),
        names::PROFILE_UNFOLLOW => urls::profile_unfollow(&string_arg(args, "username")?),
        names::POST_DETAIL => urls::post_detail(post_id_arg(args)?),
        names::POST_EDIT => urls::post_edit(post_id_arg(args)?),
        names::ADD_COMMENT => urls::add_comment(post_id_arg(args)?),
        names::POST_CREATE => urls::post_create(),
        names::FOLLOW_INDEX => urls::follow_index(),
        names::LOGIN => urls::login(),
        names::LOGOUT => urls::logout(),
        other => return Err(tera::Error::msg(format!("url(): no route named `{other}`"))),
    };
    Ok(Value::String(url))
}
