use super::controller::ExportController;
use crate::shared::components::table::{format_bytes, format_number_int};
use crate::shared::icons::icon;
use crate::shared::modal::Modal;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u601_chip_export::{ChipExport, ExportConfig, ExportPhase};
use leptos::prelude::*;
use std::sync::Arc;
use thaw::*;

fn use_export_controller() -> Option<ExportController> {
    let controller = use_context::<ExportController>();
    if controller.is_none() {
        log::error!("ExportController is not provided in context");
    }
    controller
}

/// Button that starts an export; `build_config` is called on click so the
/// export always uses the filters active at that moment.
#[component]
pub fn ExportButton(
    #[prop(into)]
    label: String,
    build_config: Callback<(), ExportConfig>,
) -> impl IntoView {
    let Some(controller) = use_export_controller() else {
        return view! { <></> }.into_any();
    };
    let (message, set_message) = signal(None::<String>);

    let on_click = move |_| {
        set_message.set(None);
        if let Err(e) = controller.initiate_export(build_config.run(())) {
            log::warn!("Export not started: {}", e);
            set_message.set(Some(e.to_string()));
        }
    };

    view! {
        <div class="export-button">
            <Button
                appearance=ButtonAppearance::Secondary
                on_click=on_click
                disabled=Signal::derive(move || controller.state.with(|s| s.is_estimating))
            >
                {icon("download")}
                " "{label}
            </Button>
            {move || message.get().map(|m| view! { <span class="export-button__message">{m}</span> })}
        </div>
    }
    .into_any()
}

/// Estimate, progress and result of the current export.
#[component]
pub fn ExportModal() -> impl IntoView {
    let Some(controller) = use_export_controller() else {
        return view! { <></> }.into_any();
    };
    let state = controller.state;

    let title = Signal::derive(move || {
        state.with(|s| match &s.config {
            Some(config) => format!("{}: {}", ChipExport::display_name(), config.filename),
            None => ChipExport::display_name().to_string(),
        })
    });

    let on_close = Callback::new(move |_| controller.close_modal());

    let footer: ChildrenFn = Arc::new(move || {
        view! {
            {move || {
                let phase = state.with(|s| s.phase);
                match phase {
                    ExportPhase::Downloading => view! {
                        <Button appearance=ButtonAppearance::Secondary on_click=move |_| controller.cancel_export()>
                            "Cancel"
                        </Button>
                    }.into_any(),
                    ExportPhase::ModalOpen | ExportPhase::Failed | ExportPhase::Cancelled => view! {
                        <Button
                            appearance=ButtonAppearance::Primary
                            on_click=move |_| {
                                if let Err(e) = controller.download_export() {
                                    log::warn!("Download not started: {}", e);
                                }
                            }
                        >
                            {icon("download")}
                            {if phase == ExportPhase::ModalOpen { " Download" } else { " Retry" }}
                        </Button>
                        <Button appearance=ButtonAppearance::Subtle on_click=move |_| controller.close_modal()>
                            "Close"
                        </Button>
                    }.into_any(),
                    _ => view! {
                        <Button appearance=ButtonAppearance::Subtle on_click=move |_| controller.close_modal()>
                            "Close"
                        </Button>
                    }.into_any(),
                }
            }}
        }
        .into_any()
    });

    view! {
        {move || {
            let (is_estimating, show_modal) = state.with(|s| (s.is_estimating, s.show_modal));
            if is_estimating && !show_modal {
                return view! {
                    <div class="export-estimating">
                        <Spinner />
                        <span>"Estimating export size..."</span>
                    </div>
                }.into_any();
            }
            if !show_modal {
                return view! { <></> }.into_any();
            }
            view! {
                <Modal title=title on_close=on_close footer=footer.clone()>
                    <ExportModalBody />
                </Modal>
            }.into_any()
        }}
    }
    .into_any()
}

#[component]
fn ExportModalBody() -> impl IntoView {
    let Some(controller) = use_export_controller() else {
        return view! { <></> }.into_any();
    };
    let state = controller.state;

    view! {
        <div class="export-modal">
            {move || state.with(|s| s.estimate.clone()).map(|estimate| {
                let approx = if estimate.is_fallback() { "~" } else { "" };
                view! {
                    <dl class="export-modal__estimate">
                        <dt>"Rows"</dt>
                        <dd>{format!("{}{}", approx, format_number_int(estimate.count as f64))}</dd>
                        <dt>"Estimated size"</dt>
                        <dd>{format!("{}{}", approx, format_bytes(estimate.bytes))}</dd>
                    </dl>
                    {estimate.is_fallback().then(|| view! {
                        <p class="export-modal__note">
                            "The server could not estimate this export; figures are approximate."
                        </p>
                    })}
                }
            })}

            {move || {
                let (phase, progress) = state.with(|s| (s.phase, s.progress));
                matches!(phase, ExportPhase::Downloading | ExportPhase::Completed).then(|| view! {
                    <div class="export-modal__progress" role="progressbar"
                        aria-valuemin="0" aria-valuemax="100" aria-valuenow=progress.to_string()>
                        <div class="export-modal__progress-bar" style=format!("width: {}%", progress)></div>
                        <span class="export-modal__progress-label">{format!("{}%", progress)}</span>
                    </div>
                })
            }}

            {move || state.with(|s| {
                match s.phase {
                    ExportPhase::Completed => Some(view! {
                        <p class="export-modal__status export-modal__status--ok">
                            {format!("Saved {}", format_bytes(s.bytes_received))}
                        </p>
                    }.into_any()),
                    ExportPhase::Cancelled => Some(view! {
                        <p class="export-modal__status">"Export cancelled"</p>
                    }.into_any()),
                    _ => s.error.clone().map(|err| view! {
                        <p class="export-modal__status export-modal__status--error">
                            <strong>"Export failed: "</strong>{err}
                        </p>
                    }.into_any()),
                }
            })}
        </div>
    }
    .into_any()
}
