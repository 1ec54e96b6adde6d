use crate::options::legend::TitlePosition;
use crate::options::TitleOptions;
use crate::spec::chart::ChartSpec;
use crate::spec::title::TitleSpec;
use log::warn;

pub fn add_title(spec: &mut ChartSpec, title: &TitleOptions) {
    if spec.title.is_some() {
        warn!("A chart has a single title, ignoring '{}'", title.text);
        return;
    }
    let anchor = match title.position {
        TitlePosition::Start => "start",
        TitlePosition::Middle => "middle",
        TitlePosition::End => "end",
    };
    spec.title = Some(TitleSpec {
        text: title.text.clone(),
        anchor: Some(anchor.to_string()),
        orient: Some("top".to_string()),
        font_weight: Some(title.font_weight.clone()),
        extra: Default::default(),
    });
}

#[cfg(test)]
mod tests {
    use crate::marks::title::add_title;
    use crate::options::legend::TitlePosition;
    use crate::options::TitleOptions;
    use crate::spec::chart::ChartSpec;
    use serde_json::json;

    #[test]
    fn test_first_title_wins() {
        let mut spec = ChartSpec::new();
        let title = |text: &str| TitleOptions {
            text: text.to_string(),
            font_weight: "bold".to_string(),
            position: TitlePosition::Start,
        };
        add_title(&mut spec, &title("Downloads"));
        add_title(&mut spec, &title("Ignored"));
        assert_eq!(
            serde_json::to_value(spec.title.unwrap()).unwrap(),
            json!({"text": "Downloads", "anchor": "start", "orient": "top", "fontWeight": "bold"})
        );
    }
}
