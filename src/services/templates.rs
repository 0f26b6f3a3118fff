use crate::models::TemplateSlot;

/// Main slots a template semester can pin
pub const MAIN_SLOTS: usize = 3;

/// The template semester to plan next. The completed-semesters counter is
/// authoritative; credit-derived standing never feeds into this.
pub fn next_semester_index(semesters_completed: u32) -> u32 {
    semesters_completed + 1
}

/// Course codes the template pins for one semester, arranged by position.
///
/// Entries are `None` where the template leaves a position open, including
/// every position of a semester index beyond the template's range. Rows
/// with positions outside the main block are ignored; the first row wins
/// if a position is duplicated.
pub fn main_codes(slots: &[TemplateSlot], semester_index: u32) -> [Option<&str>; MAIN_SLOTS] {
    let mut codes: [Option<&str>; MAIN_SLOTS] = [None; MAIN_SLOTS];
    for slot in slots {
        if slot.semester_index != semester_index {
            continue;
        }
        let Some(position) = (slot.position as usize).checked_sub(1) else {
            continue;
        };
        if position < MAIN_SLOTS && codes[position].is_none() {
            codes[position] = Some(slot.course_code.as_str());
        }
    }
    codes
}
