use std::ops::RangeInclusive;

/// Identifies what a control drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Model,
    ScrollPlayback,
    Scale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Toggle(bool),
    Slider { value: f32, min: f32, max: f32 },
    Choice { selected: String, options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub key: ControlKey,
    pub label: String,
    pub value: ControlValue,
}

/// Emitted when the user changes a control
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Toggled(ControlKey, bool),
    Slid(ControlKey, f32),
    Chose(ControlKey, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlGroup {
    pub name: String,
    pub controls: Vec<Control>,
}

impl ControlGroup {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            controls: Vec::new(),
        }
    }

    fn push(&mut self, key: ControlKey, label: &str, value: ControlValue) -> &mut Self {
        self.controls.retain(|c| c.key != key);
        self.controls.push(Control {
            key,
            label: label.to_string(),
            value,
        });
        self
    }

    pub fn toggle(&mut self, key: ControlKey, label: &str, value: bool) -> &mut Self {
        self.push(key, label, ControlValue::Toggle(value))
    }

    pub fn slider(&mut self, key: ControlKey, label: &str, value: f32, range: RangeInclusive<f32>) -> &mut Self {
        let (min, max) = range.into_inner();
        self.push(
            key,
            label,
            ControlValue::Slider {
                value: value.clamp(min, max),
                min,
                max,
            },
        )
    }

    pub fn choice(&mut self, key: ControlKey, label: &str, selected: &str, options: Vec<String>) -> &mut Self {
        self.push(
            key,
            label,
            ControlValue::Choice {
                selected: selected.to_string(),
                options,
            },
        )
    }

    pub fn remove(&mut self, key: ControlKey) -> bool {
        let before = self.controls.len();
        self.controls.retain(|c| c.key != key);
        self.controls.len() != before
    }

    pub fn get(&self, key: ControlKey) -> Option<&Control> {
        self.controls.iter().find(|c| c.key == key)
    }
}

/// Grouped, labelled controls drawn as an egui panel
#[derive(Debug, Clone, Default)]
pub struct ControlPanel {
    groups: Vec<ControlGroup>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty group `name`, replacing any existing one
    pub fn add_group(&mut self, name: &str) -> &mut ControlGroup {
        self.groups.retain(|g| g.name != name);
        self.groups.push(ControlGroup::new(name));
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    pub fn remove_group(&mut self, name: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.name != name);
        self.groups.len() != before
    }

    pub fn group(&self, name: &str) -> Option<&ControlGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn groups(&self) -> &[ControlGroup] {
        &self.groups
    }

    /// First control with `key` in any group
    pub fn find(&self, key: ControlKey) -> Option<&Control> {
        self.groups.iter().find_map(|g| g.get(key))
    }

    /// Reflect a programmatic change without emitting an event
    pub fn set_value(&mut self, key: ControlKey, value: ControlValue) {
        for control in self.groups.iter_mut().flat_map(|g| g.controls.iter_mut()) {
            if control.key == key {
                control.value = value.clone();
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> Vec<ControlEvent> {
        let mut events = Vec::new();

        for group in &mut self.groups {
            egui::CollapsingHeader::new(group.name.as_str())
                .default_open(true)
                .show(ui, |ui| {
                    for control in &mut group.controls {
                        if let Some(event) = show_control(ui, control) {
                            events.push(event);
                        }
                    }
                });
        }

        events
    }
}

fn show_control(ui: &mut egui::Ui, control: &mut Control) -> Option<ControlEvent> {
    let key = control.key;
    let label = control.label.as_str();

    match &mut control.value {
        ControlValue::Toggle(value) => ui
            .checkbox(value, label)
            .changed()
            .then(|| ControlEvent::Toggled(key, *value)),
        ControlValue::Slider { value, min, max } => ui
            .add(egui::Slider::new(value, *min..=*max).text(label))
            .changed()
            .then(|| ControlEvent::Slid(key, *value)),
        ControlValue::Choice { selected, options } => {
            let mut chosen = None;
            egui::ComboBox::from_label(label)
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for option in options.iter() {
                        if ui.selectable_label(*option == *selected, option.as_str()).clicked() {
                            chosen = Some(option.clone());
                        }
                    }
                });
            // reported even when unchanged; the session decides whether to reload
            chosen.map(|option| {
                *selected = option.clone();
                ControlEvent::Chose(key, option)
            })
        }
    }
}
