/// UseCase identification shown in logs and the export modal title
pub trait UseCaseMetadata {
    /// Index, e.g. "u601"
    fn usecase_index() -> &'static str;

    /// Technical name, e.g. "chip_export"
    fn usecase_name() -> &'static str;

    /// Name for the UI
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// "u601_chip_export"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
