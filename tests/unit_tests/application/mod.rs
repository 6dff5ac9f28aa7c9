mod history_trimmer_test;
