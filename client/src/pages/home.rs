//! Public landing page.

use leptos::prelude::*;

use crate::config::{AUTH_LANDING_PATH, LOGIN_PATH};
use crate::state::auth::AuthContext;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = expect_context::<AuthContext>();

    view! {
        <div class="home-page">
            <h1>"Box Office"</h1>
            <p class="home-page__tagline">"Tickets for every show in town."</p>
            <nav class="home-page__links">
                <Show
                    when=move || auth.is_authenticated()
                    fallback=|| view! { <a href=LOGIN_PATH class="home-link">"Sign in"</a> }
                >
                    <a href=AUTH_LANDING_PATH class="home-link">"Go to dashboard"</a>
                </Show>
            </nav>
        </div>
    }
}
