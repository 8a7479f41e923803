use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Spinner,
};
use crate::models::StructureItem;
use crate::outline::{is_tmp_id, TmpIdGenerator};
use crate::state::sync::SyncResult;
use crate::state::{
    delete_item, load_structure, save_structure, AppContext, Notice, NoticeLevel,
    OutlinerSession, SessionPhase, SyncError,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

const DRAG_MIME: &str = "text/plain";

/// Handles shared by every row of one editor instance.
#[derive(Clone, Copy)]
pub(crate) struct EditorCtx {
    app: AppContext,
    session: RwSignal<OutlinerSession>,
    project_id: StoredValue<String>,
    /// Row waiting for a second click to confirm deletion.
    confirm_delete: RwSignal<Option<String>>,
    /// Row currently under the dragged item.
    drop_target: RwSignal<Option<String>>,
}

impl EditorCtx {
    fn edit(&self, f: impl FnOnce(&mut OutlinerSession)) {
        self.session.update(f);
    }

    fn notify(&self, notice: Notice) {
        let _ = self.session.try_update(|s| s.set_notice(notice));
    }

    fn report(&self, result: SyncResult<()>) {
        match result {
            Ok(()) => {}
            Err(SyncError::Api(e)) => {
                if self.app.0.handle_auth_error(&e) {
                    self.notify(Notice::error("Your session has expired. Sign in again."));
                }
            }
            Err(SyncError::SessionClosed) => {
                log::debug!("outliner closed before the request finished");
            }
            Err(e) => self.notify(Notice::error(e.to_string())),
        }
    }

    fn load(self) {
        let client = self.app.0.api_client.get_untracked();
        let pid = self.project_id.get_value();
        spawn_local(async move {
            let result = load_structure(&client, &self.session, &pid).await;
            self.report(result);
        });
    }

    fn save(self) {
        let client = self.app.0.api_client.get_untracked();
        let pid = self.project_id.get_value();
        spawn_local(async move {
            let result = save_structure(&client, &self.session, &pid).await;
            self.report(result);
        });
    }

    fn delete(self, id: String) {
        self.confirm_delete.set(None);
        let client = self.app.0.api_client.get_untracked();
        let pid = self.project_id.get_value();
        spawn_local(async move {
            let result = delete_item(&client, &self.session, &pid, &id).await;
            self.report(result);
        });
    }

    fn add_folder(&self, parent_id: Option<String>) {
        let mut result = Ok(String::new());
        self.edit(|s| result = s.add_folder(parent_id.as_deref(), "New folder"));
        if let Err(e) = result {
            self.notify(Notice::error(e.to_string()));
        }
    }

    fn add_chapter(&self, parent_id: Option<String>) {
        let mut result = Ok(String::new());
        self.edit(|s| result = s.add_chapter(parent_id.as_deref(), "Untitled chapter"));
        if let Err(e) = result {
            self.notify(Notice::error(e.to_string()));
        }
    }
}

fn phase_label(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "Not loaded",
        SessionPhase::Loading => "Loading…",
        SessionPhase::Ready => "Saved",
        SessionPhase::Editing => "Unsaved changes",
        SessionPhase::Saving => "Saving…",
        SessionPhase::Deleting => "Deleting…",
        SessionPhase::Reloading => "Refreshing…",
    }
}

/// Story outline for one project: folders and chapter references, editable in place.
#[component]
pub fn OutlineEditor(#[prop(into)] project_id: String) -> impl IntoView {
    let app = expect_context::<AppContext>();
    let ctx = EditorCtx {
        app,
        session: RwSignal::new(OutlinerSession::new(Box::new(TmpIdGenerator))),
        project_id: StoredValue::new(project_id),
        confirm_delete: RwSignal::new(None),
        drop_target: RwSignal::new(None),
    };
    let session = ctx.session;

    // Initial fetch; the closure reads nothing tracked so it runs once.
    Effect::new(move |_| ctx.load());

    let busy = move || session.with(|s| s.is_busy());
    let phase = move || session.with(|s| s.phase());
    let can_save = move || {
        session.with(|s| {
            !s.is_busy() && s.is_loaded() && !s.reload_required() && s.has_unsaved_changes()
        })
    };
    let stats_line = move || {
        let st = session.with(|s| s.stats());
        format!("{} folders · {} chapters", st.folders, st.chapters)
    };
    let notice = move || session.with(|s| s.notice().cloned());
    let tree = move || session.with(|s| s.tree().to_vec());

    view! {
        <div class="flex flex-col gap-4">
            <div class="flex flex-wrap items-center justify-between gap-2">
                <div class="space-y-1">
                    <h2 class="text-lg font-semibold">"Story outline"</h2>
                    <p class="text-xs text-muted-foreground">
                        {stats_line}
                        " · "
                        {move || phase_label(phase())}
                    </p>
                </div>

                <div class="flex items-center gap-2">
                    <Show when=busy>
                        <Spinner />
                    </Show>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=busy
                        on:click=move |_| ctx.add_folder(None)
                    >
                        "Add folder"
                    </Button>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=busy
                        on:click=move |_| ctx.add_chapter(None)
                    >
                        "Add chapter"
                    </Button>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        attr:disabled=busy
                        on:click=move |_| ctx.load()
                    >
                        "Reload"
                    </Button>
                    <Button
                        size=ButtonSize::Sm
                        attr:disabled=move || !can_save()
                        on:click=move |_| ctx.save()
                    >
                        "Save"
                    </Button>
                </div>
            </div>

            {move || {
                notice()
                    .map(|n| {
                        let class = match n.level {
                            NoticeLevel::Error => "border-destructive/50 text-destructive",
                            NoticeLevel::Info => "",
                        };
                        view! {
                            <Alert class=class>
                                <div class="flex items-start justify-between gap-2">
                                    <AlertDescription>{n.message}</AlertDescription>
                                    <button
                                        class="text-xs text-muted-foreground hover:text-foreground"
                                        on:click=move |_| session.update(|s| s.clear_notice())
                                    >
                                        "Dismiss"
                                    </button>
                                </div>
                            </Alert>
                        }
                    })
            }}

            {move || {
                let items = tree();
                if items.is_empty() {
                    let text = if phase() == SessionPhase::Loading {
                        "Loading outline…"
                    } else {
                        "No folders or chapters yet."
                    };
                    return view! {
                        <div class="rounded-md border border-dashed px-4 py-8 text-center text-xs text-muted-foreground">
                            {text}
                        </div>
                    }
                    .into_any();
                }

                view! {
                    <div class="flex flex-col gap-1">
                        {items
                            .into_iter()
                            .map(|item| view! { <OutlineNode item=item depth=0 ctx=ctx /> })
                            .collect_view()}
                    </div>
                }
                .into_any()
            }}
        </div>
    }
}

#[component]
fn OutlineNode(item: StructureItem, depth: usize, ctx: EditorCtx) -> impl IntoView {
    let id = StoredValue::new(item.id().to_string());
    let indent_px = depth * 20;

    let row_class = move || {
        let here = Some(id.get_value());
        if ctx.drop_target.get() == here {
            "flex items-center gap-2 rounded-md px-2 py-1 bg-primary/10 ring-1 ring-primary/30"
        } else {
            "flex items-center gap-2 rounded-md px-2 py-1 hover:bg-accent/50"
        }
    };
    let confirming = move || ctx.confirm_delete.get() == Some(id.get_value());

    let (glyph, children, description) = match &item {
        StructureItem::Folder(f) => ("▾", f.children.clone(), Some(f.description.clone())),
        StructureItem::Chapter(_) => ("•", Vec::new(), None),
    };
    let is_folder = item.is_folder();
    let is_new = is_tmp_id(item.id());
    let title = item.title().to_string();

    let description_view = description.map(|desc| {
        view! {
            <textarea
                class="ml-7 min-h-[2.25rem] w-[calc(100%-1.75rem)] resize-y rounded-md border border-input bg-transparent px-3 py-1 text-xs text-muted-foreground outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50"
                placeholder="Description"
                prop:value=desc
                on:change=move |ev| {
                    let v = event_target_value(&ev);
                    ctx.edit(|s| s.update_description(&id.get_value(), &v));
                }
            />
        }
    });

    let children_view = children
        .into_iter()
        .map(|child| view! { <OutlineNode item=child depth=depth + 1 ctx=ctx /> }.into_any())
        .collect_view();

    view! {
        <div style=format!("padding-left: {}px", indent_px) class="flex flex-col gap-1">
            <div
                class=row_class
                draggable="true"
                on:dragstart=move |ev: web_sys::DragEvent| {
                    if let Some(dt) = ev.data_transfer() {
                        if let Err(e) = dt.set_data(DRAG_MIME, &id.get_value()) {
                            log::warn!("drag data not set: {e:?}");
                        }
                        dt.set_effect_allowed("move");
                    }
                }
                on:dragover=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    if let Some(dt) = ev.data_transfer() {
                        dt.set_drop_effect("move");
                    }
                    ctx.drop_target.set(Some(id.get_value()));
                }
                on:dragleave=move |_: web_sys::DragEvent| {
                    if ctx.drop_target.get_untracked() == Some(id.get_value()) {
                        ctx.drop_target.set(None);
                    }
                }
                on:dragend=move |_: web_sys::DragEvent| ctx.drop_target.set(None)
                on:drop=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    ev.stop_propagation();
                    ctx.drop_target.set(None);

                    let dragged_id = ev
                        .data_transfer()
                        .and_then(|dt| dt.get_data(DRAG_MIME).ok())
                        .unwrap_or_default();
                    if dragged_id.trim().is_empty() {
                        return;
                    }
                    let target_id = id.get_value();
                    ctx.edit(|s| s.move_item(&dragged_id, &target_id));
                }
            >
                <span class="h-5 w-5 cursor-grab text-base leading-none text-muted-foreground">
                    {glyph}
                </span>
                <input
                    class=if is_folder {
                        "h-7 min-w-0 flex-1 rounded-md border border-transparent bg-transparent px-2 text-sm font-medium outline-none hover:border-input focus-visible:border-ring"
                    } else {
                        "h-7 min-w-0 flex-1 rounded-md border border-transparent bg-transparent px-2 text-sm outline-none hover:border-input focus-visible:border-ring"
                    }
                    prop:value=title
                    on:change=move |ev| {
                        let v = event_target_value(&ev);
                        ctx.edit(|s| s.rename(&id.get_value(), &v));
                    }
                />
                <Show when=move || is_new>
                    <span class="text-[10px] uppercase tracking-wide text-muted-foreground">"new"</span>
                </Show>

                <Show when=move || is_folder>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        attr:title="Add folder inside"
                        on:click=move |_| ctx.add_folder(Some(id.get_value()))
                    >
                        "+ Folder"
                    </Button>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        attr:title="Add chapter inside"
                        on:click=move |_| ctx.add_chapter(Some(id.get_value()))
                    >
                        "+ Chapter"
                    </Button>
                </Show>

                <Show
                    when=confirming
                    fallback=move || view! {
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            class="text-destructive"
                            attr:disabled=move || ctx.session.with(|s| s.is_busy())
                            on:click=move |_| ctx.confirm_delete.set(Some(id.get_value()))
                        >
                            "Delete"
                        </Button>
                    }
                >
                    <Button
                        variant=ButtonVariant::Destructive
                        size=ButtonSize::Sm
                        on:click=move |_| ctx.delete(id.get_value())
                    >
                        "Confirm"
                    </Button>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        on:click=move |_| ctx.confirm_delete.set(None)
                    >
                        "Cancel"
                    </Button>
                </Show>
            </div>

            {description_view}
            {children_view}
        </div>
    }
    .into_any()
}
