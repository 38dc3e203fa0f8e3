//! Small models shared by unit tests.

use super::LayoutModel;
use crate::store::{StepNode, TemplateTree};
use crate::types::{CardZone, DetailSection, Field, FieldKind, Step, Template};

pub(crate) fn field_named<'a>(model: &'a LayoutModel, name: &str) -> &'a Field {
    model
        .fields()
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no field named {name}"))
}

/// Step 1: title, price, description. Step 2: photos, location.
pub(crate) fn two_step_model() -> LayoutModel {
    let template = Template::new("cars");
    let basics = Step::new(template.id.clone(), "Basics", 1);
    let media = Step::new(template.id.clone(), "Media", 2);

    let title = Field::new(basics.id.clone(), "title", "Title", FieldKind::Text)
        .with_form_order(0)
        .with_detail(DetailSection::Header, 0)
        .with_card(CardZone::HeaderTopLeft, 0);
    let price = Field::new(basics.id.clone(), "price", "Price", FieldKind::Price)
        .with_form_order(1)
        .with_detail(DetailSection::Main, 0)
        .with_card(CardZone::Footer, 0);
    let description = Field::new(
        basics.id.clone(),
        "description",
        "Description",
        FieldKind::Textarea,
    )
    .with_form_order(2)
    .with_detail(DetailSection::Main, 1);
    let photos = Field::new(media.id.clone(), "photos", "Photos", FieldKind::Gallery)
        .with_form_order(0)
        .with_detail(DetailSection::Sidebar, 0)
        .with_card(CardZone::Cover, 0);
    let location = Field::new(media.id.clone(), "location", "Location", FieldKind::Location)
        .with_form_order(1)
        .with_detail(DetailSection::Main, 2);

    LayoutModel::from_tree(TemplateTree {
        template,
        steps: vec![
            StepNode {
                step: basics,
                fields: vec![title, price, description],
            },
            StepNode {
                step: media,
                fields: vec![photos, location],
            },
        ],
    })
}

/// One step with f1, f2, f3 at form orders 0, 1, 2.
pub(crate) fn three_field_step() -> LayoutModel {
    let template = Template::new("jobs");
    let step = Step::new(template.id.clone(), "Details", 1);
    let fields = ["f1", "f2", "f3"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            Field::new(step.id.clone(), name, name.to_uppercase(), FieldKind::Text)
                .with_form_order(i as u32)
                .with_detail(DetailSection::Main, i as u32)
        })
        .collect();

    LayoutModel::from_tree(TemplateTree {
        template,
        steps: vec![StepNode { step, fields }],
    })
}

/// main = [fa, fb], sidebar = [fc]; every field hidden from the card.
pub(crate) fn detail_sections_model() -> LayoutModel {
    let template = Template::new("homes");
    let step = Step::new(template.id.clone(), "About", 1);
    let fa = Field::new(step.id.clone(), "fa", "A", FieldKind::Text)
        .with_form_order(0)
        .with_detail(DetailSection::Main, 0);
    let fb = Field::new(step.id.clone(), "fb", "B", FieldKind::Text)
        .with_form_order(1)
        .with_detail(DetailSection::Main, 1);
    let fc = Field::new(step.id.clone(), "fc", "C", FieldKind::Text)
        .with_form_order(2)
        .with_detail(DetailSection::Sidebar, 0);

    LayoutModel::from_tree(TemplateTree {
        template,
        steps: vec![StepNode {
            step,
            fields: vec![fa, fb, fc],
        }],
    })
}
