use sentence_core::{compile, FormPhase, Segment};

fn main() {
    let template = "I would like to book {eventType:type:select,placeholder:event type,options:Wedding|Birthday,required:true,icon:calendar} for {guestCount:type:number,placeholder:guests,required:true}.";

    let template = match compile(template, "booking.tpl") {
        Ok(template) => template,
        Err(e) => {
            eprintln!("Failed to compile template: {:?}", miette::Report::new(e));
            return;
        }
    };

    for segment in &template.segments {
        match segment {
            Segment::Literal { value } => print!("{value}"),
            Segment::Field { descriptor } => print!(
                "[{} {}]",
                descriptor.field_type,
                descriptor.placeholder.as_deref().unwrap_or(&descriptor.name)
            ),
        }
    }
    println!();

    let mut form = template
        .mount()
        .on_submit(|record| match record.to_json() {
            Ok(json) => println!("Submitted:\n{json}"),
            Err(e) => eprintln!("Could not serialize submission: {e}"),
        });

    if let Err(errors) = form.submit() {
        for (name, error) in &errors {
            println!("{name}: {error}");
        }
    }
    assert_eq!(form.phase(), FormPhase::Rejected);

    for (name, value) in [("eventType", "Wedding"), ("guestCount", "120")] {
        if let Err(e) = form.set_field_value(name, value) {
            eprintln!("{e}");
            return;
        }
    }
    if let Err(errors) = form.submit() {
        for (name, error) in &errors {
            println!("{name}: {error}");
        }
    }
}
