pub mod insert_broll_use_case;
