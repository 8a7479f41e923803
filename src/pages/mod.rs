use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardFooter,
    CardHeader, CardTitle, Input, Label,
};
use crate::editor::OutlineEditor;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use leptos_router::params::Params;

fn outline_href(project_id: &str) -> String {
    format!("/projects/{}/outline", urlencoding::encode(project_id.trim()))
}

/// Landing page: pick a project and (optionally) paste an access token.
#[component]
pub fn ProjectsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let project_id: RwSignal<String> = RwSignal::new(
        app_state
            .0
            .last_project_id
            .get_untracked()
            .unwrap_or_default(),
    );
    let token: RwSignal<String> = RwSignal::new(String::new());
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    let on_open = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let id = project_id.get_untracked();
        if id.trim().is_empty() {
            return;
        }
        app_state.0.remember_project(&id);
        navigate.with_value(|nav| nav(&outline_href(&id), Default::default()));
    };

    let on_save_token = move |_| {
        let t = token.get_untracked();
        if t.trim().is_empty() {
            return;
        }
        app_state.0.api_client.update(|c| {
            c.set_token(t.trim().to_string());
            c.save_to_storage();
        });
        token.set(String::new());
    };

    let on_sign_out = move |_| app_state.0.api_client.update(|c| c.logout());

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex w-full max-w-md flex-col gap-6 px-4 py-12">
                <div>
                    <h1 class="text-xl font-semibold">"Story Outliner"</h1>
                    <p class="text-xs text-muted-foreground">"Acts, stages and chapters, arranged."</p>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle>"Open a project"</CardTitle>
                        <CardDescription>"Enter the project id to edit its outline."</CardDescription>
                    </CardHeader>
                    <CardContent>
                        <form class="flex flex-col gap-4" on:submit=on_open>
                            <div class="flex flex-col gap-2">
                                <Label html_for="project-id">"Project id"</Label>
                                <Input id="project-id" placeholder="project id" bind_value=project_id />
                            </div>
                            <Button class="w-full">"Open outline"</Button>
                        </form>
                    </CardContent>
                </Card>

                <Card>
                    <CardHeader>
                        <CardTitle>"Access token"</CardTitle>
                        <CardDescription>
                            {move || if is_authenticated() {
                                "A token is stored for this browser."
                            } else {
                                "No token stored. Requests are sent without authorization."
                            }}
                        </CardDescription>
                    </CardHeader>
                    <CardContent>
                        <Input r#type="password" placeholder="paste token" bind_value=token />
                    </CardContent>
                    <CardFooter>
                        <Button size=ButtonSize::Sm on:click=on_save_token>"Save token"</Button>
                        <Show when=is_authenticated>
                            <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_sign_out>
                                "Sign out"
                            </Button>
                        </Show>
                    </CardFooter>
                </Card>
            </div>
        </div>
    }
}

#[derive(Params, PartialEq, Clone, Debug)]
pub struct ProjectRouteParams {
    pub project_id: Option<String>,
}

#[component]
pub fn OutlinerPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = leptos_router::hooks::use_params::<ProjectRouteParams>();
    let project_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.project_id)
            .unwrap_or_default()
    };

    Effect::new(move |_| {
        let id = project_id();
        if !id.trim().is_empty() {
            app_state.0.remember_project(&id);
        }
    });

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-[960px] px-4 py-8">
                <div class="mb-6 flex items-center justify-between">
                    <a href="/" class="text-xs text-muted-foreground hover:text-foreground">"← Projects"</a>
                    <span class="text-xs text-muted-foreground">{project_id}</span>
                </div>
                // Re-mount the editor (fresh session) whenever the project changes.
                {move || {
                    let id = project_id();
                    if id.trim().is_empty() {
                        view! { <div class="text-xs text-muted-foreground">"No project selected"</div> }
                            .into_any()
                    } else {
                        view! { <OutlineEditor project_id=id /> }.into_any()
                    }
                }}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_href_encodes_project_id() {
        assert_eq!(outline_href("p1"), "/projects/p1/outline");
        assert_eq!(outline_href(" my book "), "/projects/my%20book/outline");
    }
}
